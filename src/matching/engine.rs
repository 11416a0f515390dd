use tracing::{info, warn};

use crate::catalog::store::CatalogSnapshot;
use crate::core::report::DetectionReport;
use crate::core::types::PatientId;
use crate::matching::scoring::calculate_similarity;
use crate::parsing::fasta::extract_sequence;

/// A catalog entry is a detection at or above this similarity
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Screens submitted sequences against a catalog snapshot
pub struct GenomeAnalyzer<'a> {
    catalog: &'a CatalogSnapshot,
}

impl<'a> GenomeAnalyzer<'a> {
    pub fn new(catalog: &'a CatalogSnapshot) -> Self {
        Self { catalog }
    }

    /// Screen `fasta_content` against every catalog entry.
    ///
    /// Returns one report per matching disease in catalog order. Invalid FASTA
    /// yields no reports. Catalog entries whose own FASTA is invalid are skipped.
    pub fn analyze(&self, patient_id: &PatientId, fasta_content: &str) -> Vec<DetectionReport> {
        info!("Starting genome analysis for patient: {}", patient_id);

        let patient_sequence = match extract_sequence(fasta_content) {
            Ok(sequence) => sequence,
            Err(e) => {
                warn!("Invalid FASTA for patient {}: {}", patient_id, e);
                return Vec::new();
            }
        };

        let mut detections = Vec::new();
        for disease in self.catalog {
            let disease_sequence = match extract_sequence(&disease.fasta) {
                Ok(sequence) => sequence,
                Err(e) => {
                    warn!("Skipping disease {} with invalid reference FASTA: {}", disease.id, e);
                    continue;
                }
            };

            let similarity =
                calculate_similarity(patient_sequence.as_bytes(), disease_sequence.as_bytes());
            if similarity < SIMILARITY_THRESHOLD {
                continue;
            }

            let description = format!(
                "Sequence similarity detected: {:.2}% match with {}",
                similarity * 100.0,
                disease.name
            );
            warn!(
                "Disease detected for patient {}: {} (Severity: {})",
                patient_id, disease.name, disease.severity
            );

            detections.push(DetectionReport::new(
                patient_id.clone(),
                disease.id.clone(),
                disease.severity,
                similarity,
                description,
            ));
        }

        info!(
            "Genome analysis completed for patient: {}. Detections: {}",
            patient_id,
            detections.len()
        );
        detections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::disease::Disease;
    use crate::core::types::Severity;

    fn fasta(name: &str, sequence: &str) -> String {
        format!(">{name}\n{sequence}\n")
    }

    fn make_test_catalog() -> CatalogSnapshot {
        vec![
            Disease::new("D1", "Alpha", Severity::new(7).unwrap(), fasta("D1", &"ACGT".repeat(20))),
            Disease::new("D2", "Beta", Severity::new(3).unwrap(), fasta("D2", &"GGCCA".repeat(20))),
            Disease::new("D3", "Gamma", Severity::new(9).unwrap(), fasta("D3", &"ACGT".repeat(20))),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_detections_in_catalog_order() {
        let catalog = make_test_catalog();
        let analyzer = GenomeAnalyzer::new(&catalog);
        let reports = analyzer.analyze(&PatientId::new("PAT-1"), &fasta("P1", &"ACGT".repeat(20)));

        let ids: Vec<_> = reports.iter().map(|r| r.disease_id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D3"]);
        assert_eq!(reports[0].severity.value(), 7);
        assert_eq!(reports[0].patient_id, PatientId::new("PAT-1"));
        assert_eq!(
            reports[0].description,
            "Sequence similarity detected: 100.00% match with Alpha"
        );
    }

    #[test]
    fn test_no_match() {
        let catalog = make_test_catalog();
        let analyzer = GenomeAnalyzer::new(&catalog);
        let reports = analyzer.analyze(&PatientId::new("PAT-1"), &fasta("P1", &"T".repeat(80)));
        assert!(reports.is_empty());
    }

    #[test]
    fn test_invalid_submission_yields_nothing() {
        let catalog = make_test_catalog();
        let analyzer = GenomeAnalyzer::new(&catalog);
        let reports = analyzer.analyze(&PatientId::new("PAT-1"), "ACGT".repeat(20).as_str());
        assert!(reports.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // 80 of 100 positions equal -> exactly 0.8
        let reference = "A".repeat(100);
        let submitted = format!("{}{}", "C".repeat(20), "A".repeat(80));
        let catalog: CatalogSnapshot = vec![Disease::new(
            "D1",
            "Edge",
            Severity::new(5).unwrap(),
            fasta("D1", &reference),
        )]
        .into_iter()
        .collect();

        let reports = GenomeAnalyzer::new(&catalog).analyze(&PatientId::new("P"), &fasta("S", &submitted));
        assert_eq!(reports.len(), 1);
        assert!((reports[0].similarity - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_reference_is_skipped() {
        let catalog: CatalogSnapshot = vec![
            Disease::new("BAD", "Broken", Severity::new(5).unwrap(), "not fasta"),
            Disease::new("D1", "Alpha", Severity::new(7).unwrap(), fasta("D1", &"ACGT".repeat(20))),
        ]
        .into_iter()
        .collect();

        let reports = GenomeAnalyzer::new(&catalog)
            .analyze(&PatientId::new("PAT-1"), &fasta("P1", &"ACGT".repeat(20)));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].disease_id.as_str(), "D1");
    }
}
