//! Core data types for patient registration and disease screening.
//!
//! - [`Patient`]: A registered patient and the checksum of their sequence file
//! - [`Disease`]: A catalog entry with its reference sequence
//! - [`DetectionReport`]: A disease match produced by screening a submission
//! - [`PatientId`], [`DiseaseId`], [`Severity`]: Identifier and value types
//!
//! Timestamps are local wall-clock times without an offset and are rendered
//! with [`TIMESTAMP_FORMAT`] both on the wire and in the durable logs.

pub mod disease;
pub mod patient;
pub mod report;
pub mod types;

pub use disease::Disease;
pub use patient::{NewPatient, Patient, PatientUpdate};
pub use report::DetectionReport;
pub use types::{DiseaseId, PatientId, Severity, TIMESTAMP_FORMAT};
