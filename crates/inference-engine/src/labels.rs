//! Label table and label normalization

use crate::{LoadError, CATEGORIES};
use std::path::{Path, PathBuf};
use tracing::info;

/// Word separator used by raw model labels
pub const LABEL_SEPARATOR: char = '_';

/// Sidecar extension holding a label table next to the artifact
const SIDECAR_EXTENSION: &str = "labels";

/// Turn a raw label into its presentable form.
///
/// Separators become spaces, then every word is title-cased: the first letter
/// of each alphabetic run is upper-cased and the rest lower-cased. The result
/// is also the exact reference lookup query.
pub fn normalize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;

    for ch in raw.chars() {
        let ch = if ch == LABEL_SEPARATOR { ' ' } else { ch };
        if in_word {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        in_word = ch.is_alphabetic();
    }

    out
}

/// Index → raw label mapping for the model's output vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Build from an explicit list
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parse one label per line; blank lines and `#` comments are skipped
    pub fn parse(text: &str) -> Self {
        let labels = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { labels }
    }

    /// Sidecar path for an artifact: `<artifact>.labels`
    pub fn sidecar_path(artifact: &Path) -> PathBuf {
        let mut name = artifact.as_os_str().to_owned();
        name.push(".");
        name.push(SIDECAR_EXTENSION);
        PathBuf::from(name)
    }

    /// Load the sidecar for `artifact`, falling back to the bundled categories
    pub fn for_artifact(artifact: &Path) -> Result<Self, LoadError> {
        let path = Self::sidecar_path(artifact);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let table = Self::parse(&text);
        if table.is_empty() {
            return Err(LoadError::Labels {
                path,
                reason: "no labels found".to_string(),
            });
        }

        info!("Loaded {} labels from {}", table.len(), path.display());
        Ok(table)
    }

    /// Label at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            labels: CATEGORIES.iter().map(|l| l.to_string()).collect(),
        }
    }
}
