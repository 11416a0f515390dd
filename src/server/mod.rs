//! TLS server for the patient registry and screening protocol.
//!
//! Each accepted connection runs in its own task. A session reads one
//! line-terminated message at a time, dispatches it, and writes every reply
//! before reading the next message, so replies on one connection are strictly
//! ordered.
//!
//! ## Data directory layout
//!
//! ```text
//! data/
//!   disease_catalog.csv     manifest: id,name,severity (first line skipped)
//!   diseases/<id>.fasta     one reference sequence per disease
//!   patients.csv            append-only patient log
//!   disease_reports.csv     append-only detection log
//! ```
//!
//! ## Starting the server
//!
//! ```text
//! genoscreen serve --cert server.crt --key server.key
//! genoscreen serve --plaintext --port 9000 --data-dir /srv/genoscreen
//! ```

pub mod acceptor;
pub mod handlers;
pub mod session;
pub mod tls;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::catalog::{CatalogError, DiseaseCatalog};
use crate::core::{DetectionReport, Patient};
use crate::registry::{PatientRegistry, RegistryError};
use crate::storage::{AppendLog, StorageError};

pub use acceptor::{run, Server};
pub use handlers::RequestError;
pub use session::run_session;
pub use tls::TlsError;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8443;

/// Upper bound on one wire message, not counting its trailing `\n`
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

pub const MANIFEST_FILE: &str = "disease_catalog.csv";
pub const SEQUENCE_DIR: &str = "diseases";
pub const PATIENT_LOG_FILE: &str = "patients.csv";
pub const REPORT_LOG_FILE: &str = "disease_reports.csv";

/// Errors that stop the server from starting
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Locations of the catalog and the durable logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub manifest: PathBuf,
    pub sequence_dir: PathBuf,
    pub patient_log: PathBuf,
    pub report_log: PathBuf,
}

impl DataPaths {
    /// The standard layout under one data directory
    pub fn from_data_dir(dir: &Path) -> Self {
        Self {
            manifest: dir.join(MANIFEST_FILE),
            sequence_dir: dir.join(SEQUENCE_DIR),
            patient_log: dir.join(PATIENT_LOG_FILE),
            report_log: dir.join(REPORT_LOG_FILE),
        }
    }
}

/// How accepted connections are secured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Tls { cert: PathBuf, key: PathBuf },
    /// Unencrypted, for local development and tests
    Plaintext,
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub paths: DataPaths,
    pub transport: Transport,
    /// Rebuild the registry from the patient log at startup
    pub replay: bool,
    pub max_message_bytes: usize,
}

impl ServerConfig {
    /// Plaintext defaults for the given data directory
    pub fn new(data_dir: &Path) -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            paths: DataPaths::from_data_dir(data_dir),
            transport: Transport::Plaintext,
            replay: true,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// State shared by every session
pub struct AppState {
    pub registry: PatientRegistry,
    pub catalog: DiseaseCatalog,
    pub reports: AppendLog<DetectionReport>,
    pub paths: DataPaths,
}

impl AppState {
    /// Load the catalog, open both logs and optionally replay the patient log.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or a log cannot be
    /// opened or replayed.
    pub fn open(paths: DataPaths, replay: bool) -> Result<Self, ServerError> {
        let catalog = DiseaseCatalog::load(&paths.manifest, &paths.sequence_dir)?;

        let patient_log: AppendLog<Patient> = AppendLog::open(&paths.patient_log)?;
        let registry = PatientRegistry::new(patient_log);
        if replay {
            registry.replay()?;
        } else {
            warn!("Patient log replay disabled; starting with an empty registry");
        }

        let reports = AppendLog::open(&paths.report_log)?;

        Ok(Self {
            registry,
            catalog,
            reports,
            paths,
        })
    }

    /// Reload the disease catalog from disk, keeping the current one on failure.
    ///
    /// # Errors
    ///
    /// Returns the load error; the previous catalog stays active.
    pub fn reload_catalog(&self) -> Result<usize, CatalogError> {
        self.catalog
            .reload(&self.paths.manifest, &self.paths.sequence_dir)
    }
}

/// Shared handle passed to each session
pub type SharedState = Arc<AppState>;
