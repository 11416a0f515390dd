//! Sequence screening against the disease catalog.
//!
//! - [`GenomeAnalyzer`]: Screens one submitted FASTA document against every catalog entry
//! - [`calculate_similarity`]: The positional sliding-window similarity score
//!
//! ## Similarity
//!
//! Given two sequences of at least [`MIN_SEQUENCE_LENGTH`] symbols, a window of
//! width `w = min(len1, len2)` is slid over both; for every pair of start
//! offsets the number of equal symbols at equal positions is counted. The
//! score is the best count divided by `w`. This is a brute-force positional
//! comparison, not an alignment: there are no gaps and no substitution costs.
//!
//! A catalog entry is reported when its score reaches [`SIMILARITY_THRESHOLD`].
//!
//! ## Example
//!
//! ```rust
//! use genoscreen::catalog::CatalogSnapshot;
//! use genoscreen::core::{Disease, PatientId, Severity};
//! use genoscreen::matching::GenomeAnalyzer;
//!
//! let reference = "ACGT".repeat(20);
//! let catalog: CatalogSnapshot = vec![Disease::new(
//!     "D1",
//!     "Example",
//!     Severity::new(5).unwrap(),
//!     format!(">D1\n{reference}"),
//! )]
//! .into_iter()
//! .collect();
//!
//! let analyzer = GenomeAnalyzer::new(&catalog);
//! let reports = analyzer.analyze(&PatientId::new("PAT-1"), &format!(">P\n{reference}"));
//! assert_eq!(reports.len(), 1);
//! ```

pub mod engine;
pub mod scoring;

pub use engine::{GenomeAnalyzer, SIMILARITY_THRESHOLD};
pub use scoring::{calculate_similarity, MIN_SEQUENCE_LENGTH};
