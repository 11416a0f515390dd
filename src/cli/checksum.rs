use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::parsing::fasta::validate_fasta;
use crate::utils::checksum::{md5_hex, sha256_hex};

#[derive(Args)]
pub struct ChecksumArgs {
    /// FASTA file to digest
    #[arg(required = true)]
    pub input: PathBuf,

    /// Also print the MD5 digest
    #[arg(long)]
    pub md5: bool,
}

/// Print the values a client registers with `CREATE_PATIENT` for this file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn run(args: ChecksumArgs, format: OutputFormat) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let bytes = content.as_bytes();

    let sha256 = sha256_hex(bytes);
    let md5 = args.md5.then(|| md5_hex(bytes));
    let size = bytes.len();
    let validity = validate_fasta(&content);

    match format {
        OutputFormat::Text => {
            println!("File: {}", args.input.display());
            println!("SHA-256: {sha256}");
            if let Some(md5) = &md5 {
                println!("MD5: {md5}");
            }
            println!("Size: {size} bytes");
            match &validity {
                Ok(()) => println!("FASTA: valid"),
                Err(e) => println!("FASTA: invalid ({e})"),
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": args.input.display().to_string(),
                "sha256": sha256,
                "md5": md5,
                "size_bytes": size,
                "valid_fasta": validity.is_ok(),
                "error": validity.as_ref().err().map(ToString::to_string),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("file\tsha256\tmd5\tsize_bytes\tvalid_fasta");
            println!(
                "{}\t{}\t{}\t{}\t{}",
                args.input.display(),
                sha256,
                md5.unwrap_or_default(),
                size,
                validity.is_ok()
            );
        }
    }

    Ok(())
}
