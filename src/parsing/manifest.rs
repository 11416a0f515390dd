use std::path::Path;

use thiserror::Error;

use crate::core::types::{DiseaseId, Severity};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid severity on line {line}: '{value}'")]
    InvalidSeverity { line: usize, value: String },

    #[error("Severity on line {line} is {value}, expected {min}..={max}", min = Severity::MIN, max = Severity::MAX)]
    SeverityOutOfRange { line: usize, value: i64 },

    #[error("Empty disease id on line {line}")]
    EmptyId { line: usize },
}

/// One row of the disease catalog manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: DiseaseId,
    pub name: String,
    pub severity: Severity,
    /// 1-based line number in the manifest
    pub line: usize,
}

/// Parse a manifest file with columns: diseaseId, name, severity
///
/// # Errors
///
/// Returns `ManifestError::Io` if the file cannot be read, or a row error
/// from [`parse_manifest_text`].
pub fn parse_manifest_file(path: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest_text(&content)
}

/// Parse manifest text. The first line is always a header and is skipped;
/// rows with fewer than three columns (blank lines included) are ignored.
///
/// # Errors
///
/// Returns `ManifestError::InvalidSeverity` when the severity column is not an
/// integer, `ManifestError::SeverityOutOfRange` when it is outside 1..=10, or
/// `ManifestError::EmptyId` when the id column is blank.
pub fn parse_manifest_text(text: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
    let mut entries = Vec::new();

    for (i, line) in text.lines().enumerate().skip(1) {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            continue;
        }

        let line_num = i + 1;
        let id = fields[0].trim();
        if id.is_empty() {
            return Err(ManifestError::EmptyId { line: line_num });
        }

        let raw_severity = fields[2].trim();
        let value: i64 = raw_severity
            .parse()
            .map_err(|_| ManifestError::InvalidSeverity {
                line: line_num,
                value: raw_severity.to_string(),
            })?;
        let severity = Severity::new(value).ok_or(ManifestError::SeverityOutOfRange {
            line: line_num,
            value,
        })?;

        entries.push(ManifestEntry {
            id: DiseaseId::new(id),
            name: fields[1].trim().to_string(),
            severity,
            line: line_num,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_text() {
        let text = "disease_id,name,severity\nD001,Cystic Fibrosis,8\nD002, Huntington ,10\n";
        let entries = parse_manifest_text(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, DiseaseId::new("D001"));
        assert_eq!(entries[0].severity.value(), 8);
        assert_eq!(entries[1].name, "Huntington");
        assert_eq!(entries[1].line, 3);
    }

    #[test]
    fn test_header_always_skipped() {
        // The first line is skipped even when it looks like data
        let text = "D000,Skipped,1\nD001,Kept,2\n";
        let entries = parse_manifest_text(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, DiseaseId::new("D001"));
    }

    #[test]
    fn test_short_rows_ignored() {
        let text = "id,name,severity\n\nD001,Only two\nD002,Ok,3\n";
        let entries = parse_manifest_text(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, DiseaseId::new("D002"));
    }

    #[test]
    fn test_invalid_severity() {
        let text = "id,name,severity\nD001,Bad,high\n";
        assert!(matches!(
            parse_manifest_text(text),
            Err(ManifestError::InvalidSeverity { line: 2, .. })
        ));
    }

    #[test]
    fn test_severity_out_of_range() {
        let text = "id,name,severity\nD001,Bad,11\n";
        assert!(matches!(
            parse_manifest_text(text),
            Err(ManifestError::SeverityOutOfRange { line: 2, value: 11 })
        ));
    }
}
