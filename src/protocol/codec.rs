use thiserror::Error;

/// Separates the tag and each field
pub const FIELD_SEPARATOR: char = '|';

/// Prefix of an escaped character inside a field
pub const ESCAPE: char = '\\';

/// Mandatory token closing every message
pub const END_OF_TRANSMISSION: &str = "EOT";

/// Terminates a message on the wire
pub const LINE_TERMINATOR: char = '\n';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid message format: empty message")]
    Empty,

    #[error("Invalid message format: missing EOT")]
    MissingTerminator,

    #[error("Invalid message format: missing command tag")]
    MissingTag,

    #[error("Invalid message format: not valid UTF-8")]
    InvalidUtf8,

    #[error("Message exceeds maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Malformed {tag} message: {reason}")]
    Malformed { tag: String, reason: String },
}

/// A decoded message: the tag plus its positional fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub tag: String,
    pub fields: Vec<String>,
}

impl Message {
    pub fn new(tag: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            fields,
        }
    }

    /// Field at 0-based position `index` (the tag is not a field)
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Encode to a terminated wire line
    #[must_use]
    pub fn encode(&self) -> String {
        encode(&self.tag, &self.fields)
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            FIELD_SEPARATOR => {
                out.push(ESCAPE);
                out.push(FIELD_SEPARATOR);
            }
            ESCAPE => {
                out.push(ESCAPE);
                out.push(ESCAPE);
            }
            '\n' => {
                out.push(ESCAPE);
                out.push('n');
            }
            '\r' => {
                out.push(ESCAPE);
                out.push('r');
            }
            other => out.push(other),
        }
    }
}

/// Encode a tag and its fields into one wire line, terminator included.
#[must_use]
pub fn encode<S: AsRef<str>>(tag: &str, fields: &[S]) -> String {
    let payload: usize = fields.iter().map(|f| f.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(tag.len() + payload + END_OF_TRANSMISSION.len() + 2);

    escape_into(&mut out, tag);
    for field in fields {
        out.push(FIELD_SEPARATOR);
        escape_into(&mut out, field.as_ref());
    }
    out.push(FIELD_SEPARATOR);
    out.push_str(END_OF_TRANSMISSION);
    out.push(LINE_TERMINATOR);
    out
}

/// Decode one wire line (with or without its line terminator).
///
/// # Errors
///
/// Returns `ProtocolError::Empty` for blank input, `ProtocolError::MissingTerminator`
/// when the line does not end with `EOT`, or `ProtocolError::MissingTag` when
/// nothing precedes the first separator.
pub fn decode(line: &str) -> Result<Message, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty);
    }

    let body = trimmed
        .strip_suffix(END_OF_TRANSMISSION)
        .ok_or(ProtocolError::MissingTerminator)?;

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut ends_with_separator = false;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        ends_with_separator = false;
        match c {
            ESCAPE => match chars.next() {
                Some(FIELD_SEPARATOR) => current.push(FIELD_SEPARATOR),
                Some(ESCAPE) => current.push(ESCAPE),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                // Unknown escapes are kept literally
                Some(other) => {
                    current.push(ESCAPE);
                    current.push(other);
                }
                None => current.push(ESCAPE),
            },
            FIELD_SEPARATOR => {
                parts.push(std::mem::take(&mut current));
                ends_with_separator = true;
            }
            other => current.push(other),
        }
    }
    // The separator before EOT closes the last field rather than opening a new one
    if !ends_with_separator {
        parts.push(current);
    }

    let mut parts = parts.into_iter();
    let tag = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or(ProtocolError::MissingTag)?;

    Ok(Message {
        tag,
        fields: parts.collect(),
    })
}
