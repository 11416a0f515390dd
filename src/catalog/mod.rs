//! Disease catalog loading and lookup.
//!
//! The catalog is read once at startup from a comma-separated manifest
//! (`diseaseId,name,severity`, header row skipped) plus one FASTA file per
//! disease named `<diseaseId>.fasta` in a sequence directory. Any missing
//! sequence file or unparseable severity aborts the load.
//!
//! ## Example
//!
//! ```rust,no_run
//! use genoscreen::catalog::DiseaseCatalog;
//! use std::path::Path;
//!
//! let catalog = DiseaseCatalog::load(
//!     Path::new("data/disease_catalog.csv"),
//!     Path::new("data/diseases"),
//! ).unwrap();
//!
//! for disease in catalog.snapshot().iter() {
//!     println!("{disease}");
//! }
//! ```
//!
//! ## Reloading
//!
//! [`DiseaseCatalog::reload`] builds a complete replacement before swapping it
//! in, so concurrent readers see either the old or the new catalog. Readers
//! holding a [`CatalogSnapshot`] keep it for as long as they need.

pub mod store;

pub use store::{CatalogError, CatalogSnapshot, DiseaseCatalog, SEQUENCE_EXTENSION};
