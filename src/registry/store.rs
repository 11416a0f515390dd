use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::SubsecRound;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::{NewPatient, Patient, PatientId, PatientUpdate};
use crate::storage::{AppendLog, StorageError};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Patient not found: {0}")]
    NotFound(PatientId),

    #[error("Patient with document ID already exists: {0}")]
    DuplicateDocumentId(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of rebuilding the registry from its log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Rows applied, including superseded versions of the same patient
    pub rows_applied: usize,
    pub rows_skipped: usize,
    pub patients: usize,
}

#[derive(Debug, Default)]
struct RegistryState {
    patients: HashMap<PatientId, Patient>,

    /// Index: document ID -> patient ID. Entries are never removed.
    document_ids: HashMap<String, PatientId>,
}

impl RegistryState {
    fn insert(&mut self, patient: Patient) {
        self.document_ids
            .insert(patient.document_id.clone(), patient.patient_id.clone());
        self.patients.insert(patient.patient_id.clone(), patient);
    }
}

/// Concurrency-safe store of patient records.
#[derive(Debug)]
pub struct PatientRegistry {
    state: RwLock<RegistryState>,

    /// Held for the whole of create/update/delete, including the durable append
    writer: Mutex<()>,

    log: Option<AppendLog<Patient>>,
}

impl PatientRegistry {
    /// A registry backed by `log`. Nothing is read from the log until
    /// [`PatientRegistry::replay`] is called.
    pub fn new(log: AppendLog<Patient>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            writer: Mutex::new(()),
            log: Some(log),
        }
    }

    /// A registry with no durable log, for tests and offline tools
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            writer: Mutex::new(()),
            log: None,
        }
    }

    /// Rebuild the registry from the patient log.
    ///
    /// The last row for each patient ID wins. Rows that fail to parse are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    pub fn replay(&self) -> Result<ReplaySummary, RegistryError> {
        let Some(log) = &self.log else {
            return Ok(ReplaySummary::default());
        };

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let rows = log.read_rows()?;

        let mut rebuilt = RegistryState::default();
        let mut summary = ReplaySummary::default();
        for (i, row) in rows.iter().enumerate() {
            match Patient::from_record_fields(row) {
                Ok(patient) => {
                    rebuilt.insert(patient);
                    summary.rows_applied += 1;
                }
                Err(reason) => {
                    // +2: one for the header, one for 1-based numbering
                    warn!(
                        "Skipping patient log row {} in {}: {reason}",
                        i + 2,
                        log.path().display()
                    );
                    summary.rows_skipped += 1;
                }
            }
        }
        summary.patients = rebuilt.patients.len();

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = rebuilt;
        info!(
            "Replayed {} patients from {} ({} rows, {} skipped)",
            summary.patients,
            log.path().display(),
            summary.rows_applied,
            summary.rows_skipped
        );
        Ok(summary)
    }

    /// Register a new patient and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateDocumentId`] if any patient, active or
    /// not, already holds the document ID.
    pub fn create(&self, new: NewPatient) -> Result<Patient, RegistryError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let patient_id = {
            let state = self.read_state();
            if state.document_ids.contains_key(&new.document_id) {
                return Err(RegistryError::DuplicateDocumentId(new.document_id));
            }
            let mut id = PatientId::generate();
            while state.patients.contains_key(&id) {
                id = PatientId::generate();
            }
            id
        };

        let registered_at = chrono::Local::now().naive_local().trunc_subsecs(0);
        let patient = Patient::register(patient_id, new, registered_at);

        self.persist(&patient);
        self.write_state().insert(patient.clone());
        info!("Patient created: {}", patient.patient_id);
        Ok(patient)
    }

    /// Current record for `patient_id`, including inactive patients.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown ID.
    pub fn get(&self, patient_id: &PatientId) -> Result<Patient, RegistryError> {
        self.read_state()
            .patients
            .get(patient_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(patient_id.clone()))
    }

    /// Replace the mutable fields of a patient.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown ID.
    pub fn update(
        &self,
        patient_id: &PatientId,
        update: PatientUpdate,
    ) -> Result<Patient, RegistryError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut patient = self.get(patient_id)?;
        patient.apply(update);

        self.persist(&patient);
        self.write_state().insert(patient.clone());
        info!("Patient updated: {patient_id}");
        Ok(patient)
    }

    /// Mark a patient inactive. The record and its document ID stay reserved.
    ///
    /// Deleting an inactive patient succeeds and still appends a log row.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown ID.
    pub fn delete(&self, patient_id: &PatientId) -> Result<Patient, RegistryError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut patient = self.get(patient_id)?;
        if !patient.active {
            debug!("Patient {patient_id} already inactive");
        }
        patient.active = false;

        self.persist(&patient);
        self.write_state().insert(patient.clone());
        info!("Patient deleted: {patient_id}");
        Ok(patient)
    }

    /// Number of patients ever registered
    pub fn len(&self) -> usize {
        self.read_state().patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the new state of a patient. A failed append is logged and the
    /// in-memory mutation still goes ahead.
    fn persist(&self, patient: &Patient) {
        if let Some(log) = &self.log {
            if let Err(e) = log.append(patient) {
                error!("Durable append for patient {} failed: {e}", patient.patient_id);
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
