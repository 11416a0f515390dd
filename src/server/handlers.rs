//! Request dispatch: one decoded line in, one or more responses out.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::{DetectionReport, PatientId};
use crate::matching::GenomeAnalyzer;
use crate::parsing::fasta::is_valid_fasta;
use crate::protocol::{decode, Command, CommandError, ProtocolError, Response};
use crate::registry::RegistryError;
use crate::server::SharedState;
use crate::utils::checksum::verify_checksum;

pub const NO_DISEASE_MESSAGE: &str = "No diseases detected";

/// Any failure that turns a request into a single `ERROR` reply
#[derive(Error, Debug)]
pub enum RequestError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid FASTA format")]
    InvalidFasta,

    #[error("FASTA checksum verification failed")]
    ChecksumMismatch,

    #[error("Genome analysis failed: {0}")]
    Analysis(String),
}

/// Handle one received line.
///
/// Never fails: any error becomes exactly one `ERROR` response.
pub async fn handle_line(state: &SharedState, line: &str) -> Vec<Response> {
    debug!("Raw message received: '{line}'");
    match process_line(state, line).await {
        Ok(responses) => responses,
        Err(e) => {
            warn!("Request rejected: {e}");
            vec![Response::error(e.to_string())]
        }
    }
}

async fn process_line(state: &SharedState, line: &str) -> Result<Vec<Response>, RequestError> {
    let message = decode(line)?;
    let command = Command::from_message(&message)?;
    dispatch(state, command).await
}

/// Execute a parsed command against the shared state.
///
/// # Errors
///
/// Returns the reason the command could not be carried out.
pub async fn dispatch(state: &SharedState, command: Command) -> Result<Vec<Response>, RequestError> {
    match command {
        Command::CreatePatient(new) => {
            let patient = state.registry.create(new)?;
            Ok(vec![Response::success(
                "Patient created successfully",
                vec![patient.patient_id.to_string()],
            )])
        }
        Command::GetPatient { patient_id } => {
            let patient = state.registry.get(&patient_id)?;
            info!("Retrieved patient: {patient_id}");
            Ok(vec![Response::success(
                "Patient retrieved successfully",
                patient.record_fields(),
            )])
        }
        Command::UpdatePatient { patient_id, update } => {
            state.registry.update(&patient_id, update)?;
            Ok(vec![Response::success("Patient updated successfully", Vec::new())])
        }
        Command::DeletePatient { patient_id } => {
            state.registry.delete(&patient_id)?;
            Ok(vec![Response::success("Patient deleted successfully", Vec::new())])
        }
        Command::SendFasta {
            patient_id,
            fasta_content,
        } => screen_submission(state, patient_id, fasta_content).await,
    }
}

/// Validate, verify and screen a submitted sequence.
///
/// Inactive patients can still be screened.
async fn screen_submission(
    state: &SharedState,
    patient_id: PatientId,
    fasta_content: String,
) -> Result<Vec<Response>, RequestError> {
    let patient = state.registry.get(&patient_id)?;

    if !is_valid_fasta(&fasta_content) {
        return Err(RequestError::InvalidFasta);
    }
    if !verify_checksum(&fasta_content, &patient.checksum_fasta) {
        return Err(RequestError::ChecksumMismatch);
    }

    let detections = analyze(state, patient_id.clone(), fasta_content).await?;
    info!(
        "Processed FASTA for patient: {patient_id}. Detections: {}",
        detections.len()
    );

    if detections.is_empty() {
        return Ok(vec![Response::NoDisease {
            message: NO_DISEASE_MESSAGE.to_string(),
        }]);
    }

    if let Err(e) = state.reports.append_all(&detections) {
        error!("Failed to save detection reports for {patient_id}: {e}");
    }

    Ok(detections
        .into_iter()
        .map(|report| Response::DiseaseDetected {
            disease_id: report.disease_id,
            severity: report.severity,
            description: report.description,
        })
        .collect())
}

/// Run the CPU-bound screen off the async workers.
async fn analyze(
    state: &SharedState,
    patient_id: PatientId,
    fasta_content: String,
) -> Result<Vec<DetectionReport>, RequestError> {
    let catalog = state.catalog.snapshot();
    tokio::task::spawn_blocking(move || {
        GenomeAnalyzer::new(&catalog).analyze(&patient_id, &fasta_content)
    })
    .await
    .map_err(|e| RequestError::Analysis(e.to_string()))
}
