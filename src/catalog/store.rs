use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::disease::Disease;
use crate::core::types::DiseaseId;
use crate::parsing::manifest::{parse_manifest_file, ManifestError};

/// Extension of per-disease sequence files
pub const SEQUENCE_EXTENSION: &str = "fasta";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to load catalog manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("Sequence file for disease '{id}' not found: {path}")]
    MissingSequence { id: DiseaseId, path: PathBuf },

    #[error("Failed to read sequence file {path}: {source}")]
    SequenceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable, ordered set of diseases
///
/// Iteration follows manifest order.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    diseases: Vec<Disease>,

    /// Index: disease ID -> index in diseases vec
    id_to_index: HashMap<DiseaseId, usize>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a disease. A repeated ID replaces the earlier entry in place.
    pub fn add_disease(&mut self, disease: Disease) {
        if let Some(&idx) = self.id_to_index.get(&disease.id) {
            self.diseases[idx] = disease;
            return;
        }
        self.id_to_index.insert(disease.id.clone(), self.diseases.len());
        self.diseases.push(disease);
    }

    /// Get a disease by ID
    pub fn get(&self, id: &DiseaseId) -> Option<&Disease> {
        self.id_to_index.get(id).map(|&idx| &self.diseases[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Disease> {
        self.diseases.iter()
    }

    /// Number of diseases in the snapshot
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }
}

impl FromIterator<Disease> for CatalogSnapshot {
    fn from_iter<I: IntoIterator<Item = Disease>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for disease in iter {
            snapshot.add_disease(disease);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a CatalogSnapshot {
    type Item = &'a Disease;
    type IntoIter = std::slice::Iter<'a, Disease>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The live disease catalog shared by every session
#[derive(Debug, Default)]
pub struct DiseaseCatalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl DiseaseCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-built snapshot
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Load a catalog from a manifest and its sequence directory.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Manifest` if the manifest is missing or has an
    /// invalid severity, `CatalogError::MissingSequence` if a listed disease
    /// has no sequence file, or `CatalogError::SequenceRead` if one cannot be read.
    pub fn load(manifest_path: &Path, sequence_dir: &Path) -> Result<Self, CatalogError> {
        Ok(Self::from_snapshot(read_catalog(manifest_path, sequence_dir)?))
    }

    /// Replace the whole catalog with a fresh load, returning the new size.
    ///
    /// The previous catalog stays active when loading fails.
    ///
    /// # Errors
    ///
    /// Same as [`DiseaseCatalog::load`].
    pub fn reload(&self, manifest_path: &Path, sequence_dir: &Path) -> Result<usize, CatalogError> {
        let snapshot = Arc::new(read_catalog(manifest_path, sequence_dir)?);
        let count = snapshot.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        info!("Disease catalog reloaded. Total diseases: {}", count);
        Ok(count)
    }

    /// The current catalog contents; unaffected by later reloads
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn lookup(&self, id: &DiseaseId) -> Option<Disease> {
        self.snapshot().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.snapshot().len()
    }

    /// Copy of every disease in catalog order
    pub fn all(&self) -> Vec<Disease> {
        self.snapshot().iter().cloned().collect()
    }
}

/// Path of the sequence file for `id` inside `sequence_dir`
pub fn sequence_path(sequence_dir: &Path, id: &DiseaseId) -> PathBuf {
    sequence_dir.join(format!("{}.{SEQUENCE_EXTENSION}", id.as_str()))
}

fn read_catalog(manifest_path: &Path, sequence_dir: &Path) -> Result<CatalogSnapshot, CatalogError> {
    info!("Loading disease catalog from {}", manifest_path.display());

    let entries = parse_manifest_file(manifest_path).map_err(|source| CatalogError::Manifest {
        path: manifest_path.to_path_buf(),
        source,
    })?;

    let mut snapshot = CatalogSnapshot::new();
    for entry in entries {
        let path = sequence_path(sequence_dir, &entry.id);
        if !path.is_file() {
            return Err(CatalogError::MissingSequence { id: entry.id, path });
        }
        let fasta = std::fs::read_to_string(&path)
            .map_err(|source| CatalogError::SequenceRead { path, source })?;

        debug!("Loaded disease: {} - {}", entry.id, entry.name);
        snapshot.add_disease(Disease {
            id: entry.id,
            name: entry.name,
            severity: entry.severity,
            fasta,
        });
    }

    info!(
        "Disease catalog loaded successfully. Total diseases: {}",
        snapshot.len()
    );
    Ok(snapshot)
}
