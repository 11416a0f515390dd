use chrono::NaiveDateTime;

use crate::core::types::{PatientId, TIMESTAMP_FORMAT};

/// Number of fields produced by [`Patient::record_fields`]
pub const PATIENT_RECORD_FIELDS: usize = 11;

/// A registered patient
///
/// `patient_id`, `document_id` and `registration_date` are fixed at creation.
/// Deletion only clears `active`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: PatientId,
    pub full_name: String,
    /// External identity document, unique across every patient ever created
    pub document_id: String,
    pub age: u32,
    pub sex: char,
    pub contact_email: String,
    pub registration_date: NaiveDateTime,
    pub clinical_notes: String,
    /// Hex digest of the sequence file registered with the patient
    pub checksum_fasta: String,
    pub file_size_bytes: u64,
    pub active: bool,
}

/// Registration data supplied by a client before an identifier exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub full_name: String,
    pub document_id: String,
    pub age: u32,
    pub sex: char,
    pub contact_email: String,
    pub clinical_notes: String,
    pub checksum_fasta: String,
    pub file_size_bytes: u64,
}

/// The mutable subset of a patient record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientUpdate {
    pub full_name: String,
    pub age: u32,
    pub sex: char,
    pub contact_email: String,
    pub clinical_notes: String,
}

impl Patient {
    /// Build an active patient record from registration data.
    #[must_use]
    pub fn register(patient_id: PatientId, new: NewPatient, registered_at: NaiveDateTime) -> Self {
        Self {
            patient_id,
            full_name: new.full_name,
            document_id: new.document_id,
            age: new.age,
            sex: new.sex,
            contact_email: new.contact_email,
            registration_date: registered_at,
            clinical_notes: new.clinical_notes,
            checksum_fasta: new.checksum_fasta,
            file_size_bytes: new.file_size_bytes,
            active: true,
        }
    }

    /// Overwrite the mutable fields, leaving identity, checksum and status alone.
    pub fn apply(&mut self, update: PatientUpdate) {
        self.full_name = update.full_name;
        self.age = update.age;
        self.sex = update.sex;
        self.contact_email = update.contact_email;
        self.clinical_notes = update.clinical_notes;
    }

    /// Field values in log column order (see [`Patient::from_record_fields`]).
    #[must_use]
    pub fn record_fields(&self) -> Vec<String> {
        vec![
            self.patient_id.to_string(),
            self.full_name.clone(),
            self.document_id.clone(),
            self.age.to_string(),
            self.sex.to_string(),
            self.contact_email.clone(),
            self.registration_date.format(TIMESTAMP_FORMAT).to_string(),
            self.clinical_notes.clone(),
            self.checksum_fasta.clone(),
            self.file_size_bytes.to_string(),
            self.active.to_string(),
        ]
    }

    /// Rebuild a patient from the fields written by [`Patient::record_fields`].
    ///
    /// # Errors
    ///
    /// Returns a description of the first field that fails to parse.
    pub fn from_record_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, String> {
        if fields.len() != PATIENT_RECORD_FIELDS {
            return Err(format!(
                "expected {PATIENT_RECORD_FIELDS} fields, found {}",
                fields.len()
            ));
        }
        let field = |i: usize| fields[i].as_ref();

        let age = field(3)
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid age '{}'", field(3)))?;
        let sex = parse_sex(field(4)).ok_or_else(|| "empty sex code".to_string())?;
        let registration_date = NaiveDateTime::parse_from_str(field(6).trim(), TIMESTAMP_FORMAT)
            .map_err(|e| format!("invalid registration date '{}': {e}", field(6)))?;
        let file_size_bytes = field(9)
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid file size '{}'", field(9)))?;
        let active = field(10)
            .trim()
            .parse::<bool>()
            .map_err(|_| format!("invalid active flag '{}'", field(10)))?;

        Ok(Self {
            patient_id: PatientId::new(field(0)),
            full_name: field(1).to_string(),
            document_id: field(2).to_string(),
            age,
            sex,
            contact_email: field(5).to_string(),
            registration_date,
            clinical_notes: field(7).to_string(),
            checksum_fasta: field(8).to_string(),
            file_size_bytes,
            active,
        })
    }
}

/// The sex code is the first character of the supplied text.
#[must_use]
pub fn parse_sex(s: &str) -> Option<char> {
    s.trim().chars().next()
}
