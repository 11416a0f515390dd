use thiserror::Error;

use crate::core::patient::{parse_sex, NewPatient, PatientUpdate};
use crate::core::types::PatientId;
use crate::protocol::codec::Message;

pub const CREATE_PATIENT: &str = "CREATE_PATIENT";
pub const GET_PATIENT: &str = "GET_PATIENT";
pub const UPDATE_PATIENT: &str = "UPDATE_PATIENT";
pub const DELETE_PATIENT: &str = "DELETE_PATIENT";
pub const SEND_FASTA: &str = "SEND_FASTA";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Insufficient parameters for {command}: expected {expected}, found {found}")]
    MissingFields {
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },
}

/// A request sent by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreatePatient(NewPatient),
    GetPatient {
        patient_id: PatientId,
    },
    UpdatePatient {
        patient_id: PatientId,
        update: PatientUpdate,
    },
    DeletePatient {
        patient_id: PatientId,
    },
    SendFasta {
        patient_id: PatientId,
        fasta_content: String,
    },
}

fn require(message: &Message, command: &'static str, expected: usize) -> Result<(), CommandError> {
    if message.fields.len() < expected {
        return Err(CommandError::MissingFields {
            command,
            expected,
            found: message.fields.len(),
        });
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, CommandError> {
    value.trim().parse().map_err(|_| CommandError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_sex_field(value: &str) -> Result<char, CommandError> {
    parse_sex(value).ok_or_else(|| CommandError::InvalidField {
        field: "sex",
        value: value.to_string(),
    })
}

impl Command {
    /// Wire tag of this command
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreatePatient(_) => CREATE_PATIENT,
            Self::GetPatient { .. } => GET_PATIENT,
            Self::UpdatePatient { .. } => UPDATE_PATIENT,
            Self::DeletePatient { .. } => DELETE_PATIENT,
            Self::SendFasta { .. } => SEND_FASTA,
        }
    }

    /// Interpret a decoded message as a command.
    ///
    /// Extra trailing fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Unknown` for an unrecognized tag,
    /// `CommandError::MissingFields` when required fields are absent, or
    /// `CommandError::InvalidField` when age, sex or file size cannot be parsed.
    pub fn from_message(message: &Message) -> Result<Self, CommandError> {
        let f = |i: usize| message.fields[i].clone();

        match message.tag.as_str() {
            CREATE_PATIENT => {
                require(message, CREATE_PATIENT, 8)?;
                Ok(Self::CreatePatient(NewPatient {
                    full_name: f(0),
                    document_id: f(1),
                    age: parse_number("age", &message.fields[2])?,
                    sex: parse_sex_field(&message.fields[3])?,
                    contact_email: f(4),
                    clinical_notes: f(5),
                    checksum_fasta: f(6),
                    file_size_bytes: parse_number("file size", &message.fields[7])?,
                }))
            }
            GET_PATIENT => {
                require(message, GET_PATIENT, 1)?;
                Ok(Self::GetPatient {
                    patient_id: PatientId::new(f(0)),
                })
            }
            UPDATE_PATIENT => {
                require(message, UPDATE_PATIENT, 6)?;
                Ok(Self::UpdatePatient {
                    patient_id: PatientId::new(f(0)),
                    update: PatientUpdate {
                        full_name: f(1),
                        age: parse_number("age", &message.fields[2])?,
                        sex: parse_sex_field(&message.fields[3])?,
                        contact_email: f(4),
                        clinical_notes: f(5),
                    },
                })
            }
            DELETE_PATIENT => {
                require(message, DELETE_PATIENT, 1)?;
                Ok(Self::DeletePatient {
                    patient_id: PatientId::new(f(0)),
                })
            }
            SEND_FASTA => {
                require(message, SEND_FASTA, 2)?;
                Ok(Self::SendFasta {
                    patient_id: PatientId::new(f(0)),
                    fasta_content: f(1),
                })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// Build the message a client sends for this command
    pub fn to_message(&self) -> Message {
        let fields = match self {
            Self::CreatePatient(p) => vec![
                p.full_name.clone(),
                p.document_id.clone(),
                p.age.to_string(),
                p.sex.to_string(),
                p.contact_email.clone(),
                p.clinical_notes.clone(),
                p.checksum_fasta.clone(),
                p.file_size_bytes.to_string(),
            ],
            Self::GetPatient { patient_id } | Self::DeletePatient { patient_id } => {
                vec![patient_id.to_string()]
            }
            Self::UpdatePatient { patient_id, update } => vec![
                patient_id.to_string(),
                update.full_name.clone(),
                update.age.to_string(),
                update.sex.to_string(),
                update.contact_email.clone(),
                update.clinical_notes.clone(),
            ],
            Self::SendFasta {
                patient_id,
                fasta_content,
            } => vec![patient_id.to_string(), fasta_content.clone()],
        };
        Message::new(self.tag(), fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::decode;

    fn message(line: &str) -> Message {
        decode(line).unwrap()
    }

    #[test]
    fn test_parse_create_patient() {
        let cmd = Command::from_message(&message(
            "CREATE_PATIENT|Ada|DOC-1|36|F|ada@example.org|notes \\| more|abc123|42|EOT",
        ))
        .unwrap();

        let Command::CreatePatient(p) = cmd else {
            panic!("expected CreatePatient");
        };
        assert_eq!(p.full_name, "Ada");
        assert_eq!(p.document_id, "DOC-1");
        assert_eq!(p.age, 36);
        assert_eq!(p.sex, 'F');
        assert_eq!(p.clinical_notes, "notes | more");
        assert_eq!(p.checksum_fasta, "abc123");
        assert_eq!(p.file_size_bytes, 42);
    }

    #[test]
    fn test_create_patient_missing_fields() {
        let err = Command::from_message(&message("CREATE_PATIENT|Ada|DOC-1|36|EOT")).unwrap_err();
        assert_eq!(
            err,
            CommandError::MissingFields {
                command: CREATE_PATIENT,
                expected: 8,
                found: 3
            }
        );
    }

    #[test]
    fn test_invalid_numbers() {
        let err = Command::from_message(&message(
            "CREATE_PATIENT|Ada|DOC-1|old|F|a@b|n|abc|42|EOT",
        ))
        .unwrap_err();
        assert!(matches!(err, CommandError::InvalidField { field: "age", .. }));

        let err = Command::from_message(&message(
            "CREATE_PATIENT|Ada|DOC-1|36|F|a@b|n|abc|-5|EOT",
        ))
        .unwrap_err();
        assert!(matches!(err, CommandError::InvalidField { field: "file size", .. }));
    }

    #[test]
    fn test_empty_sex_rejected() {
        let err = Command::from_message(&message("UPDATE_PATIENT|PAT-1|Ada|36||a@b|n|EOT"))
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidField { field: "sex", .. }));
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::from_message(&message("DROP_TABLES|x|EOT")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown command: DROP_TABLES");
    }

    #[test]
    fn test_send_fasta_requires_content() {
        assert!(Command::from_message(&message("SEND_FASTA|PAT-1|EOT")).is_err());
        let cmd = Command::from_message(&message("SEND_FASTA|PAT-1|>S1\\nACGT|EOT")).unwrap();
        assert_eq!(
            cmd,
            Command::SendFasta {
                patient_id: PatientId::new("PAT-1"),
                fasta_content: ">S1\nACGT".to_string(),
            }
        );
    }

    #[test]
    fn test_to_message_parses_back() {
        let cmd = Command::UpdatePatient {
            patient_id: PatientId::new("PAT-1"),
            update: PatientUpdate {
                full_name: "Ada|King".to_string(),
                age: 37,
                sex: 'F',
                contact_email: "a@b".to_string(),
                clinical_notes: "line1\nline2".to_string(),
            },
        };
        let parsed = Command::from_message(&decode(&cmd.to_message().encode()).unwrap()).unwrap();
        assert_eq!(parsed, cmd);
    }
}
