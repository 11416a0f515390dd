//! The line-oriented wire protocol.
//!
//! Every exchange is one message per line:
//!
//! ```text
//! TAG|field1|field2|...|fieldN|EOT\n
//! ```
//!
//! Field values are escaped so that any string survives the trip: `\` is sent
//! as `\\`, `|` as `\|`, line feed as `\n` and carriage return as `\r`.
//!
//! ## Commands
//!
//! | Tag | Fields |
//! |-----|--------|
//! | `CREATE_PATIENT` | fullName, documentId, age, sex, email, notes, checksum, fileSizeBytes |
//! | `GET_PATIENT` | patientId |
//! | `UPDATE_PATIENT` | patientId, fullName, age, sex, email, notes |
//! | `DELETE_PATIENT` | patientId |
//! | `SEND_FASTA` | patientId, fastaContent |
//!
//! ## Responses
//!
//! | Tag | Fields |
//! |-----|--------|
//! | `SUCCESS` | message, then operation data |
//! | `ERROR` | message |
//! | `DISEASE_DETECTED` | diseaseId, severity, description |
//! | `NO_DISEASE` | message |
//!
//! `SEND_FASTA` is the only request answered by more than one message: zero or
//! more `DISEASE_DETECTED` followed by nothing, or a single `NO_DISEASE`, or a
//! single `ERROR`.
//!
//! ## Example
//!
//! ```rust
//! use genoscreen::protocol::codec::{decode, encode};
//!
//! let line = encode("GET_PATIENT", &["PAT-1A2B3C4D"]);
//! assert_eq!(line, "GET_PATIENT|PAT-1A2B3C4D|EOT\n");
//!
//! let message = decode(&line).unwrap();
//! assert_eq!(message.tag, "GET_PATIENT");
//! assert_eq!(message.fields, vec!["PAT-1A2B3C4D"]);
//! ```

pub mod codec;
pub mod command;
pub mod response;

pub use codec::{decode, encode, Message, ProtocolError};
pub use command::{Command, CommandError};
pub use response::Response;
