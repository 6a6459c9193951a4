// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Vendor candidate sources
//!
//! Every vendor scraper hands the reconciler the same candidate shape. How a
//! vendor page is fetched and cleaned up stays behind [`CandidateSource`].

use crate::types::{Candidate, FilamentItem};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions tried, in order, for a product's candidate file
const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Produces scraped candidates for a product
pub trait CandidateSource {
    /// Candidates observed for `material`, or `None` when the source has
    /// nothing for it
    fn candidates(&mut self, material: &FilamentItem) -> Result<Option<Vec<Candidate>>>;
}

impl CandidateSource for BTreeMap<String, Vec<Candidate>> {
    fn candidates(&mut self, material: &FilamentItem) -> Result<Option<Vec<Candidate>>> {
        Ok(self.get(&material.id).cloned())
    }
}

/// Candidates written by an external scraper, one file per product
///
/// `<dir>/<material-id>.yaml` holds either a sequence of candidates or a
/// mapping with a `candidates` (or `variants`) sequence.
#[derive(Debug, Clone)]
pub struct DirectoryCandidates {
    dir: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    List(Vec<Candidate>),
    Wrapped {
        #[serde(alias = "variants")]
        candidates: Vec<Candidate>,
    },
}

impl CandidateFile {
    fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::List(candidates) | Self::Wrapped { candidates } => candidates,
        }
    }
}

impl DirectoryCandidates {
    /// Read candidates from `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Candidate file of a product, if one exists
    #[must_use]
    pub fn file_for(&self, id: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl CandidateSource for DirectoryCandidates {
    fn candidates(&mut self, material: &FilamentItem) -> Result<Option<Vec<Candidate>>> {
        let Some(path) = self.file_for(&material.id) else {
            return Ok(None);
        };
        debug!("Reading candidates from {}", path.display());
        read_candidates(&path).map(Some)
    }
}

/// Parse a candidate file
pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let file: CandidateFile = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?
    };

    Ok(file.into_candidates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn material(id: &str) -> FilamentItem {
        serde_json::from_value(serde_json::json!({ "id": id, "name": id })).unwrap()
    }

    #[test]
    fn test_reads_plain_sequence() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pla.yaml"),
            "- name: Blue\n  sizes:\n    1.75mm/1000g:\n      sku: B1\n      link: https://example.com/b\n",
        )
        .unwrap();

        let found = DirectoryCandidates::new(dir.path()).candidates(&material("pla")).unwrap().unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sizes["1.75mm/1000g"].sku.as_deref(), Some("B1"));
    }

    #[test]
    fn test_reads_wrapped_json_with_numeric_ean() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("petg.json"),
            r#"{"variants": [{"name": "Black", "images": [{"url": "https://img/b.jpg"}],
                "sizes": {"1.75mm/1000g": {"ean": 5903175657534}}}]}"#,
        )
        .unwrap();

        let found = DirectoryCandidates::new(dir.path()).candidates(&material("petg")).unwrap().unwrap();

        assert_eq!(found[0].sizes["1.75mm/1000g"].ean.as_deref(), Some("5903175657534"));
        assert_eq!(found[0].images[0].url, "https://img/b.jpg");
    }

    #[test]
    fn test_primary_size_is_first_in_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pla.yaml"),
            "- name: Blue\n  sizes:\n    1.75mm/250g:\n      sku: SMALL\n    1.75mm/1000g:\n      sku: LARGE\n",
        )
        .unwrap();

        let found = DirectoryCandidates::new(dir.path()).candidates(&material("pla")).unwrap().unwrap();

        let (key, size) = found[0].primary_size().unwrap();
        assert_eq!(key, "1.75mm/250g");
        assert_eq!(size.sku.as_deref(), Some("SMALL"));
        assert_eq!(found[0].identity().sku, Some("SMALL"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let found = DirectoryCandidates::new(dir.path()).candidates(&material("abs")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_broken_file_names_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("asa.yaml"), "name: [oops\n").unwrap();

        let err = DirectoryCandidates::new(dir.path()).candidates(&material("asa")).unwrap_err();

        assert!(err.to_string().contains("asa.yaml"));
    }
}
