//! Programmatic client for the genomic screening protocol.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), genoscreen::client::ClientError> {
//! use genoscreen::client::GenomicClient;
//! use genoscreen::core::PatientId;
//!
//! let mut client = GenomicClient::connect_plain("127.0.0.1:8443").await?;
//! let patient = client.get_patient(&PatientId::new("PAT-1A2B3C4D")).await?;
//! println!("{} ({})", patient.full_name, patient.patient_id);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_rustls::client::TlsStream;
use tokio::time::timeout;
use tokio_rustls::rustls::pki_types::ServerName;
use tracing::debug;

use crate::core::{DiseaseId, NewPatient, Patient, PatientId, PatientUpdate, Severity};
use crate::protocol::{decode, Command, ProtocolError, Response};
use crate::server::tls::{client_connector, TlsError};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Invalid server name: {0}")]
    InvalidServerName(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server answered with `ERROR`
    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected {0} response")]
    UnexpectedResponse(&'static str),

    #[error("Invalid patient record from server: {0}")]
    InvalidRecord(String),

    #[error("Server closed the connection")]
    ConnectionClosed,
}

/// One disease reported for a submitted sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub disease_id: DiseaseId,
    pub severity: Severity,
    pub description: String,
}

/// How long `send_fasta` waits for another detection before treating the
/// reply as complete
pub const DEFAULT_DETECTION_IDLE: Duration = Duration::from_millis(500);

/// A connection to the server over any byte stream
pub struct GenomicClient<S> {
    stream: BufReader<S>,
    line: Vec<u8>,
    detection_idle: Duration,
}

impl GenomicClient<TcpStream> {
    /// Connect without TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connection fails.
    pub async fn connect_plain(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        Ok(Self::new(TcpStream::connect(addr).await?))
    }
}

impl GenomicClient<TlsStream<TcpStream>> {
    /// Connect over TLS, trusting the certificates in `ca_cert`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA file is unusable, `server_name` is not a
    /// valid DNS name or IP address, or the connection or handshake fails.
    pub async fn connect_tls(
        addr: impl ToSocketAddrs,
        server_name: &str,
        ca_cert: &Path,
    ) -> Result<Self, ClientError> {
        let connector = client_connector(ca_cert)?;
        let name = ServerName::try_from(server_name)
            .map_err(|_| ClientError::InvalidServerName(server_name.to_string()))?
            .to_owned();

        let tcp = TcpStream::connect(addr).await?;
        let stream = connector.connect(name, tcp).await?;
        Ok(Self::new(stream))
    }
}

impl<S> GenomicClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            line: Vec::new(),
            detection_idle: DEFAULT_DETECTION_IDLE,
        }
    }

    /// Set how long to wait for further detections once one has arrived.
    #[must_use]
    pub fn with_detection_idle(mut self, idle: Duration) -> Self {
        self.detection_idle = idle;
        self
    }

    /// Register a patient and return the assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] if the server rejects the patient.
    pub async fn create_patient(&mut self, patient: NewPatient) -> Result<PatientId, ClientError> {
        let data = self.expect_success(&Command::CreatePatient(patient)).await?;
        data.into_iter()
            .next()
            .map(PatientId::new)
            .ok_or_else(|| ClientError::InvalidRecord("missing patient id".to_string()))
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Server`] for an unknown patient.
    pub async fn get_patient(&mut self, patient_id: &PatientId) -> Result<Patient, ClientError> {
        let data = self
            .expect_success(&Command::GetPatient {
                patient_id: patient_id.clone(),
            })
            .await?;
        Patient::from_record_fields(&data).map_err(ClientError::InvalidRecord)
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Server`] for an unknown patient.
    pub async fn update_patient(
        &mut self,
        patient_id: &PatientId,
        update: PatientUpdate,
    ) -> Result<(), ClientError> {
        self.expect_success(&Command::UpdatePatient {
            patient_id: patient_id.clone(),
            update,
        })
        .await
        .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Server`] for an unknown patient.
    pub async fn delete_patient(&mut self, patient_id: &PatientId) -> Result<(), ClientError> {
        self.expect_success(&Command::DeletePatient {
            patient_id: patient_id.clone(),
        })
        .await
        .map(|_| ())
    }

    /// Submit a sequence for screening.
    ///
    /// Returns the detections in catalog order; empty when the server reports
    /// no disease. The server sends no terminator after detections, so once
    /// the first one arrives the reply ends when the stream closes or stays
    /// quiet for the detection idle period.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] if the submission is rejected, or
    /// [`ClientError::ConnectionClosed`] if the stream ends before any reply.
    pub async fn send_fasta(
        &mut self,
        patient_id: &PatientId,
        fasta_content: &str,
    ) -> Result<Vec<Detection>, ClientError> {
        self.send(&Command::SendFasta {
            patient_id: patient_id.clone(),
            fasta_content: fasta_content.to_string(),
        })
        .await?;

        let mut detections = Vec::new();
        loop {
            let next = if detections.is_empty() {
                self.read_response().await?
            } else {
                match timeout(self.detection_idle, self.read_response()).await {
                    Ok(next) => next?,
                    Err(_) => return Ok(detections),
                }
            };
            let response = match next {
                Some(response) => response,
                // Without NO_DISEASE the detections read so far are the whole reply
                None if !detections.is_empty() => return Ok(detections),
                None => return Err(ClientError::ConnectionClosed),
            };
            match response {
                Response::DiseaseDetected {
                    disease_id,
                    severity,
                    description,
                } => detections.push(Detection {
                    disease_id,
                    severity,
                    description,
                }),
                Response::NoDisease { .. } => return Ok(detections),
                Response::Error { message } => return Err(ClientError::Server(message)),
                other @ Response::Success { .. } => {
                    return Err(ClientError::UnexpectedResponse(other.tag()))
                }
            }
        }
    }

    async fn expect_success(&mut self, command: &Command) -> Result<Vec<String>, ClientError> {
        self.send(command).await?;
        match self.read_response().await?.ok_or(ClientError::ConnectionClosed)? {
            Response::Success { data, .. } => Ok(data),
            Response::Error { message } => Err(ClientError::Server(message)),
            other => Err(ClientError::UnexpectedResponse(other.tag())),
        }
    }

    async fn send(&mut self, command: &Command) -> Result<(), ClientError> {
        let line = command.to_message().encode();
        debug!("Sending {} request", command.tag());
        let stream = self.stream.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Next response, or `None` at end of stream.
    ///
    /// A partial line left by a cancelled read stays buffered for the next call.
    async fn read_response(&mut self) -> Result<Option<Response>, ClientError> {
        if self.stream.read_until(b'\n', &mut self.line).await? == 0 {
            return Ok(None);
        }
        let line = std::mem::take(&mut self.line);
        let text = String::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)?;
        Ok(Some(Response::from_message(decode(&text)?)?))
    }
}
