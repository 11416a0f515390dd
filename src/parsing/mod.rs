//! Parsers for the text formats the server reads.
//!
//! - **FASTA**: Strict single-record validator and sequence extraction used both
//!   for patient submissions and for catalog reference sequences
//! - **Manifest**: The comma-separated disease catalog manifest
//!
//! ## Example
//!
//! ```rust
//! use genoscreen::parsing::fasta::{extract_sequence, is_valid_fasta};
//!
//! let content = ">S1\nacgt\nNNAC";
//! assert!(is_valid_fasta(content));
//! assert_eq!(extract_sequence(content).unwrap(), "ACGTNNAC");
//! ```

pub mod fasta;
pub mod manifest;
