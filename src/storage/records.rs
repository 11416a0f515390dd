//! Row layouts of the patient and detection logs.

use crate::core::types::TIMESTAMP_FORMAT;
use crate::core::{DetectionReport, Patient};

use super::csv::{field, quoted};
use super::log::LogRecord;

impl LogRecord for Patient {
    const HEADER: &'static str = "patient_id,full_name,document_id,age,sex,contact_email,\
registration_date,clinical_notes,checksum_fasta,file_size_bytes,active";

    /// Name and notes are always quoted, other columns only when they need it.
    fn to_row(&self) -> String {
        let fields = self.record_fields();
        fields
            .iter()
            .enumerate()
            .map(|(i, value)| match i {
                1 | 7 => quoted(value),
                _ => field(value),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl LogRecord for DetectionReport {
    const HEADER: &'static str = "patient_id,disease_id,severity,detection_datetime,description";

    fn to_row(&self) -> String {
        [
            field(self.patient_id.as_str()),
            field(self.disease_id.as_str()),
            self.severity.to_string(),
            self.detected_at.format(TIMESTAMP_FORMAT).to_string(),
            quoted(&self.description),
        ]
        .join(",")
    }
}
