use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::types::{DiseaseId, PatientId, Severity};

/// A disease detected in a patient's submitted sequence
///
/// Reports are write-once: they are appended to the detection log and never updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub patient_id: PatientId,
    pub disease_id: DiseaseId,
    pub severity: Severity,
    pub detected_at: NaiveDateTime,
    /// Similarity fraction in [0, 1] that triggered the detection
    pub similarity: f64,
    pub description: String,
}

impl DetectionReport {
    /// Build a report stamped with the current local time.
    pub fn new(
        patient_id: PatientId,
        disease_id: DiseaseId,
        severity: Severity,
        similarity: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            patient_id,
            disease_id,
            severity,
            detected_at: chrono::Local::now().naive_local(),
            similarity,
            description: description.into(),
        }
    }
}
