//! Append-only flat-file persistence.
//!
//! Each log is a comma-separated file whose first line names the columns.
//! Records are only ever appended: a patient update or deletion writes a new
//! row carrying the full new state, so the latest row per patient id is the
//! current one.
//!
//! - [`AppendLog`]: Serialized appends of [`LogRecord`] rows to one file
//! - [`csv`]: Field quoting and a reader that understands quoted newlines

pub mod csv;
pub mod log;
pub mod records;

pub use log::{AppendLog, LogRecord, StorageError};
