//! Strict FASTA validation and sequence extraction.
//!
//! A document is accepted when, after trimming, it has a header line of the
//! form `>` followed by one or more ASCII letters, digits or underscores, and
//! at least one further line. Every line after the header, trimmed and
//! uppercased, must consist only of `A`, `C`, `G`, `T` and `N`. Blank lines
//! between sequence lines are rejected.

use thiserror::Error;

/// Symbols permitted in a sequence line (after uppercasing)
pub const SEQUENCE_ALPHABET: &[u8] = b"ACGTN";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FastaError {
    #[error("FASTA content is empty")]
    Empty,

    #[error("FASTA content has no sequence line")]
    MissingSequence,

    #[error("Invalid FASTA header: '{0}'")]
    InvalidHeader(String),

    #[error("Invalid sequence on line {line}: only A, C, G, T and N are allowed")]
    InvalidSequence { line: usize },
}

fn lines(content: &str) -> Vec<&str> {
    content.trim().split('\n').collect()
}

fn is_valid_header(line: &str) -> bool {
    line.strip_prefix('>').is_some_and(|name| {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

fn is_valid_sequence_line(line: &str) -> bool {
    !line.is_empty()
        && line
            .bytes()
            .all(|b| SEQUENCE_ALPHABET.contains(&b.to_ascii_uppercase()))
}

/// Validate `content`, reporting the first problem found.
///
/// # Errors
///
/// Returns a [`FastaError`] describing why the content is not valid FASTA.
pub fn validate_fasta(content: &str) -> Result<(), FastaError> {
    if content.trim().is_empty() {
        return Err(FastaError::Empty);
    }

    let lines = lines(content);
    if lines.len() < 2 {
        return Err(FastaError::MissingSequence);
    }

    let header = lines[0].trim();
    if !is_valid_header(header) {
        return Err(FastaError::InvalidHeader(header.to_string()));
    }

    for (i, line) in lines.iter().enumerate().skip(1) {
        if !is_valid_sequence_line(line.trim()) {
            // 1-based for user-facing messages
            return Err(FastaError::InvalidSequence { line: i + 1 });
        }
    }

    Ok(())
}

/// Check whether `content` is valid FASTA.
#[must_use]
pub fn is_valid_fasta(content: &str) -> bool {
    validate_fasta(content).is_ok()
}

/// Concatenate all sequence lines, uppercased and without separators.
///
/// # Errors
///
/// Returns a [`FastaError`] if the content is not valid FASTA.
pub fn extract_sequence(content: &str) -> Result<String, FastaError> {
    validate_fasta(content)?;

    Ok(lines(content)
        .iter()
        .skip(1)
        .map(|line| line.trim().to_ascii_uppercase())
        .collect())
}

/// Return the header name without the leading `>`.
///
/// # Errors
///
/// Returns a [`FastaError`] if the content is not valid FASTA.
pub fn extract_header(content: &str) -> Result<String, FastaError> {
    validate_fasta(content)?;

    Ok(lines(content)[0].trim()[1..].to_string())
}
