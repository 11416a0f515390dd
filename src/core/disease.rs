use crate::core::types::{DiseaseId, Severity};

/// A disease signature loaded from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disease {
    pub id: DiseaseId,
    pub name: String,
    pub severity: Severity,
    /// Raw FASTA text of the reference sequence, header line included
    pub fasta: String,
}

impl Disease {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: Severity,
        fasta: impl Into<String>,
    ) -> Self {
        Self {
            id: DiseaseId::new(id),
            name: name.into(),
            severity,
            fasta: fasta.into(),
        }
    }
}

impl std::fmt::Display for Disease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} (severity {})", self.id, self.name, self.severity)
    }
}
