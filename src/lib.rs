//! # genoscreen
//!
//! A patient registry and disease-signature screening server.
//!
//! Clients register patients together with the checksum of their sequence file,
//! then submit the FASTA content for screening. The server verifies the
//! checksum, compares the sequence against every disease in its catalog with a
//! sliding-window similarity scan, and streams back one `DISEASE_DETECTED`
//! message per match (or a single `NO_DISEASE`).
//!
//! ## Features
//!
//! - **Line protocol**: Pipe-delimited, escaped, `EOT`-terminated messages over TLS
//! - **Durable registry**: Append-only CSV log, replayed at startup
//! - **Soft delete**: Deleted patients keep their record and document ID
//! - **Hot catalog reload**: The disease catalog can be swapped without a restart
//! - **Detection log**: Every detection is appended to a report log
//!
//! ## Example
//!
//! ```rust
//! use genoscreen::catalog::CatalogSnapshot;
//! use genoscreen::core::{Disease, PatientId, Severity};
//! use genoscreen::matching::GenomeAnalyzer;
//!
//! let reference = "ACGTTGCA".repeat(8);
//! let mut catalog = CatalogSnapshot::new();
//! catalog.add_disease(Disease::new(
//!     "D001",
//!     "Example Syndrome",
//!     Severity::new(7).unwrap(),
//!     format!(">D001\n{reference}"),
//! ));
//!
//! let analyzer = GenomeAnalyzer::new(&catalog);
//! let reports = analyzer.analyze(&PatientId::new("PAT-1"), &format!(">sample\n{reference}"));
//! assert_eq!(reports.len(), 1);
//! assert!(reports[0].similarity >= 0.8);
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Wire codec and typed commands and responses
//! - [`registry`]: Concurrency-safe patient store
//! - [`catalog`]: Disease catalog loading and hot reload
//! - [`matching`]: Similarity scoring and the genome analyzer
//! - [`storage`]: Append-only CSV logs
//! - [`server`]: TLS acceptor and per-connection sessions
//! - [`client`]: Programmatic protocol client
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod client;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::{CatalogSnapshot, DiseaseCatalog};
pub use client::GenomicClient;
pub use crate::core::types::*;
pub use crate::core::{DetectionReport, Disease, NewPatient, Patient, PatientUpdate};
pub use matching::GenomeAnalyzer;
pub use protocol::{Command, Message, Response};
pub use registry::PatientRegistry;
pub use server::{ServerConfig, Transport};
