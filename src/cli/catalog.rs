use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::catalog::DiseaseCatalog;
use crate::cli::{OutputFormat, DEFAULT_DATA_DIR};
use crate::core::{Disease, DiseaseId};
use crate::parsing::fasta::{extract_header, extract_sequence};
use crate::server::DataPaths;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,

    /// Data directory containing disease_catalog.csv and diseases/
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all diseases in the catalog
    List,

    /// Show details of a specific disease
    Show {
        /// Disease ID
        #[arg(required = true)]
        id: String,
    },
}

/// Execute the catalog command
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the disease is unknown.
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let paths = DataPaths::from_data_dir(&args.data_dir);
    let catalog = DiseaseCatalog::load(&paths.manifest, &paths.sequence_dir)
        .with_context(|| format!("loading catalog from {}", args.data_dir.display()))?;

    if verbose {
        eprintln!("Loaded catalog with {} diseases", catalog.count());
    }

    match args.command {
        CatalogCommands::List => run_list(&catalog.all(), format),
        CatalogCommands::Show { id } => {
            let disease = catalog
                .lookup(&DiseaseId::new(id.as_str()))
                .ok_or_else(|| anyhow::anyhow!("Disease not found: {id}"))?;
            run_show(&disease, format)
        }
    }
}

/// Length of the reference sequence, or `None` if its FASTA is invalid
fn sequence_length(disease: &Disease) -> Option<usize> {
    extract_sequence(&disease.fasta).ok().map(|s| s.len())
}

fn run_list(diseases: &[Disease], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            let id_width = diseases.iter().map(|d| d.id.as_str().len()).max().unwrap_or(2).max(2);
            let name_width = diseases
                .iter()
                .map(|d| d.name.len().min(40))
                .max()
                .unwrap_or(4)
                .max(4);
            let total_width = id_width + name_width + 8 + 10 + 3;

            println!("Disease Catalog ({} diseases)\n", diseases.len());
            println!(
                "{:<id_w$} {:<name_w$} {:>8} {:>10}",
                "ID",
                "Name",
                "Severity",
                "Length",
                id_w = id_width,
                name_w = name_width
            );
            println!("{}", "-".repeat(total_width));

            for d in diseases {
                let length = sequence_length(d).map_or_else(|| "invalid".to_string(), |n| n.to_string());
                println!(
                    "{:<id_w$} {:<name_w$} {:>8} {:>10}",
                    d.id.as_str(),
                    truncate(&d.name, name_width),
                    d.severity.value(),
                    length,
                    id_w = id_width,
                    name_w = name_width
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = diseases
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "name": d.name,
                        "severity": d.severity,
                        "sequence_length": sequence_length(d),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tname\tseverity\tsequence_length");
            for d in diseases {
                println!(
                    "{}\t{}\t{}\t{}",
                    d.id,
                    d.name,
                    d.severity,
                    sequence_length(d).map_or_else(String::new, |n| n.to_string())
                );
            }
        }
    }

    Ok(())
}

fn run_show(disease: &Disease, format: OutputFormat) -> anyhow::Result<()> {
    let header = extract_header(&disease.fasta).ok();
    let length = sequence_length(disease);

    match format {
        OutputFormat::Text => {
            println!("Disease: {}", disease.name);
            println!("ID: {}", disease.id);
            println!("Severity: {}", disease.severity);
            match (header, length) {
                (Some(header), Some(length)) => {
                    println!("Reference header: {header}");
                    println!("Reference length: {length}");
                }
                _ => println!("Reference: invalid FASTA (skipped during screening)"),
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": disease.id,
                "name": disease.name,
                "severity": disease.severity,
                "reference_header": header,
                "sequence_length": length,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("field\tvalue");
            println!("id\t{}", disease.id);
            println!("name\t{}", disease.name);
            println!("severity\t{}", disease.severity);
            println!("reference_header\t{}", header.unwrap_or_default());
            println!(
                "sequence_length\t{}",
                length.map_or_else(String::new, |n| n.to_string())
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
