//! Command-line interface for genoscreen.
//!
//! Available commands:
//!
//! - **serve**: Run the patient registry and screening server
//! - **catalog**: List or show diseases in a catalog
//! - **screen**: Screen a FASTA file against a catalog without a server
//! - **checksum**: Print the digest and size to register with a patient
//!
//! ## Usage
//!
//! ```text
//! # Serve over TLS with the default data directory
//! genoscreen serve --cert server.crt --key server.key
//!
//! # Local development without TLS
//! genoscreen serve --plaintext --port 9000
//!
//! # Inspect the catalog as JSON
//! genoscreen catalog list --format json
//!
//! # Check a sample before submitting it
//! genoscreen checksum sample.fasta
//! genoscreen screen sample.fasta
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::server::{DEFAULT_ADDRESS, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_PORT};

pub mod catalog;
pub mod checksum;
pub mod screen;
pub mod serve;

/// Default location of the catalog and the durable logs
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser)]
#[command(name = "genoscreen")]
#[command(version)]
#[command(about = "Patient registry and disease-signature screening server")]
#[command(
    long_about = "genoscreen registers patients, stores the checksum of their sequence file, and screens submitted FASTA sequences against a catalog of disease signatures.\n\nClients talk to the server over TLS with a line-oriented, pipe-delimited protocol. Every registry change and every detection is appended to a CSV log."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the screening server
    Serve(ServeArgs),

    /// Inspect the disease catalog
    Catalog(catalog::CatalogArgs),

    /// Screen a FASTA file against the catalog offline
    Screen(screen::ScreenArgs),

    /// Print the checksum and size of a FASTA file
    Checksum(checksum::ChecksumArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Directory holding the catalog and the patient and report logs
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// PEM certificate chain
    #[arg(long, required_unless_present = "plaintext", requires = "key")]
    pub cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, required_unless_present = "plaintext", requires = "cert")]
    pub key: Option<PathBuf>,

    /// Serve without TLS (development only)
    #[arg(long, conflicts_with_all = ["cert", "key"])]
    pub plaintext: bool,

    /// Start with an empty registry instead of replaying the patient log
    #[arg(long)]
    pub no_replay: bool,

    /// Largest accepted message in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_BYTES)]
    pub max_message_bytes: usize,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
