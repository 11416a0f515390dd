use crate::core::types::{DiseaseId, Severity};
use crate::protocol::codec::{Message, ProtocolError};

pub const SUCCESS: &str = "SUCCESS";
pub const ERROR: &str = "ERROR";
pub const DISEASE_DETECTED: &str = "DISEASE_DETECTED";
pub const NO_DISEASE: &str = "NO_DISEASE";

/// A message sent by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Operation succeeded; `data` carries operation-specific fields
    Success { message: String, data: Vec<String> },
    Error { message: String },
    DiseaseDetected {
        disease_id: DiseaseId,
        severity: Severity,
        description: String,
    },
    NoDisease { message: String },
}

impl Response {
    pub fn success(message: impl Into<String>, data: Vec<String>) -> Self {
        Self::Success {
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Success { .. } => SUCCESS,
            Self::Error { .. } => ERROR,
            Self::DiseaseDetected { .. } => DISEASE_DETECTED,
            Self::NoDisease { .. } => NO_DISEASE,
        }
    }

    /// Whether this response ends a `SEND_FASTA` reply stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::DiseaseDetected { .. })
    }

    pub fn to_message(&self) -> Message {
        let fields = match self {
            Self::Success { message, data } => {
                let mut fields = Vec::with_capacity(data.len() + 1);
                fields.push(message.clone());
                fields.extend(data.iter().cloned());
                fields
            }
            Self::Error { message } | Self::NoDisease { message } => vec![message.clone()],
            Self::DiseaseDetected {
                disease_id,
                severity,
                description,
            } => vec![
                disease_id.to_string(),
                severity.to_string(),
                description.clone(),
            ],
        };
        Message::new(self.tag(), fields)
    }

    /// Interpret a decoded message as a server response.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Malformed` for an unknown tag, missing fields,
    /// or a severity outside 1..=10.
    pub fn from_message(message: Message) -> Result<Self, ProtocolError> {
        let malformed = |reason: &str| ProtocolError::Malformed {
            tag: message.tag.clone(),
            reason: reason.to_string(),
        };

        match message.tag.as_str() {
            SUCCESS => {
                let mut fields = message.fields.clone().into_iter();
                let text = fields.next().ok_or_else(|| malformed("missing message"))?;
                Ok(Self::Success {
                    message: text,
                    data: fields.collect(),
                })
            }
            ERROR | NO_DISEASE => {
                let text = message
                    .fields
                    .first()
                    .cloned()
                    .ok_or_else(|| malformed("missing message"))?;
                Ok(if message.tag == ERROR {
                    Self::Error { message: text }
                } else {
                    Self::NoDisease { message: text }
                })
            }
            DISEASE_DETECTED => {
                let [id, severity, description, ..] = message.fields.as_slice() else {
                    return Err(malformed("expected diseaseId, severity, description"));
                };
                let severity = severity
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(Severity::new)
                    .ok_or_else(|| malformed("invalid severity"))?;
                Ok(Self::DiseaseDetected {
                    disease_id: DiseaseId::new(id.clone()),
                    severity,
                    description: description.clone(),
                })
            }
            _ => Err(malformed("unknown response tag")),
        }
    }
}
