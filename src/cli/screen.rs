use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use crate::catalog::DiseaseCatalog;
use crate::cli::{OutputFormat, DEFAULT_DATA_DIR};
use crate::core::PatientId;
use crate::matching::GenomeAnalyzer;
use crate::parsing::fasta::validate_fasta;
use crate::server::DataPaths;

/// Patient label used in offline screening logs
const OFFLINE_PATIENT: &str = "OFFLINE";

#[derive(Args)]
pub struct ScreenArgs {
    /// FASTA file to screen
    #[arg(required = true)]
    pub input: PathBuf,

    /// Data directory containing disease_catalog.csv and diseases/
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

/// Screen a local FASTA file with the same analyzer the server uses.
///
/// Nothing is written to the detection log.
///
/// # Errors
///
/// Returns an error if the catalog or input cannot be loaded, or the input is
/// not valid FASTA.
pub fn run(args: ScreenArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let paths = DataPaths::from_data_dir(&args.data_dir);
    let catalog = DiseaseCatalog::load(&paths.manifest, &paths.sequence_dir)
        .with_context(|| format!("loading catalog from {}", args.data_dir.display()))?;
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    if let Err(e) = validate_fasta(&content) {
        bail!("{} is not valid FASTA: {e}", args.input.display());
    }

    if verbose {
        eprintln!(
            "Screening {} against {} diseases",
            args.input.display(),
            catalog.count()
        );
    }

    let snapshot = catalog.snapshot();
    let detections =
        GenomeAnalyzer::new(&snapshot).analyze(&PatientId::new(OFFLINE_PATIENT), &content);

    match format {
        OutputFormat::Text => {
            if detections.is_empty() {
                println!("No diseases detected");
            }
            for d in &detections {
                let name = snapshot.get(&d.disease_id).map_or("", |disease| disease.name.as_str());
                println!(
                    "DETECTED {} {} (severity {}): {:.2}% similarity",
                    d.disease_id,
                    name,
                    d.severity,
                    d.similarity * 100.0
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&detections)?);
        }
        OutputFormat::Tsv => {
            println!("disease_id\tseverity\tsimilarity\tdescription");
            for d in &detections {
                println!(
                    "{}\t{}\t{:.4}\t{}",
                    d.disease_id, d.severity, d.similarity, d.description
                );
            }
        }
    }

    Ok(())
}
