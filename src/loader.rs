// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Catalog source loading
//!
//! A collection directory holds one item per child: either a directory with
//! an `index.<ext>` definition, keyed by the directory name, or a definition
//! file keyed by its stem. Children are visited in file name order.

use crate::error::CatalogError;
use crate::types::{CollectionSpec, RawItem};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default definition file patterns
pub const DEFAULT_PATTERNS: &[&str] = &["*.yaml", "*.yml", "*.json"];

/// Stem of the definition file inside an item directory
const INDEX_STEM: &str = "index";

/// Loads collections from a catalog source tree
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    root: PathBuf,
    definitions: GlobSet,
}

impl CatalogLoader {
    /// Loader accepting the default definition patterns
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        Self::with_patterns(root, DEFAULT_PATTERNS)
    }

    /// Loader accepting definition files matching any of `patterns`
    pub fn with_patterns<S: AsRef<str>>(
        root: impl Into<PathBuf>,
        patterns: &[S],
    ) -> Result<Self, CatalogError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(Self {
            root: root.into(),
            definitions: builder.build()?,
        })
    }

    /// Root of the catalog source tree
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every item of one collection
    pub fn load_collection(&self, spec: &CollectionSpec) -> Result<Vec<RawItem>, CatalogError> {
        let dir = self.root.join(&spec.id);
        info!("[{}]", spec.id);

        let mut items = Vec::new();
        let mut seen = HashSet::new();

        for child in sorted_children(&dir)? {
            let Some(path) = self.definition_for(&child)? else {
                continue;
            };
            let id = if child.is_dir() {
                file_name(&child)
            } else {
                child
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            };

            let item = RawItem::from_document(&id, read_document(&path)?);
            if !seen.insert(item.id.clone()) {
                return Err(CatalogError::DuplicateItem {
                    collection: spec.id.clone(),
                    id: item.id,
                    path,
                });
            }

            debug!("   -> {}", item.id);
            items.push(item);
        }

        Ok(items)
    }

    /// Load all collections in declaration order
    pub fn load_all(
        &self,
        specs: &[CollectionSpec],
    ) -> Result<Vec<(CollectionSpec, Vec<RawItem>)>, CatalogError> {
        specs
            .iter()
            .map(|spec| Ok((spec.clone(), self.load_collection(spec)?)))
            .collect()
    }

    /// Resolve the definition file of a collection child
    fn definition_for(&self, child: &Path) -> Result<Option<PathBuf>, CatalogError> {
        if child.is_dir() {
            let index = sorted_children(child)?.into_iter().find(|p| {
                p.is_file()
                    && p.file_stem().is_some_and(|s| s == INDEX_STEM)
                    && self.is_definition(p)
            });
            if index.is_none() {
                warn!("Directory {} has no index definition, skipping", child.display());
            }
            return Ok(index);
        }

        Ok(self.is_definition(child).then(|| child.to_path_buf()))
    }

    fn is_definition(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.definitions.is_match(name))
    }
}

/// Immediate children of a directory, sorted by file name
fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            entry
                .map(walkdir::DirEntry::into_path)
                .map_err(|e| CatalogError::io(dir, e.into()))
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read and decode one definition document into a mapping
pub fn read_document(path: &Path) -> Result<serde_json::Map<String, Value>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;

    let value: Value = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).map_err(|source| CatalogError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CatalogError::NotAMapping { path: path.to_path_buf() }),
    }
}

/// Load all collections from `root` with the default patterns
pub fn load_catalog(
    root: &Path,
    specs: &[CollectionSpec],
) -> Result<Vec<(CollectionSpec, Vec<RawItem>)>, CatalogError> {
    CatalogLoader::new(root)?.load_all(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn vendors() -> CollectionSpec {
        CollectionSpec::new("vendors", false)
    }

    #[test]
    fn test_directory_and_flat_items() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendors/prusament/index.yaml", "name: Prusament\n");
        write(dir.path(), "vendors/elegoo.yaml", "name: Elegoo\n");
        write(dir.path(), "vendors/polymaker.json", r#"{"name": "Polymaker"}"#);

        let items = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap();

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["elegoo", "polymaker", "prusament"]);
        assert_eq!(items[2].fields["name"], "Prusament");
    }

    #[test]
    fn test_skips_dirs_without_index_and_other_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendors/empty/notes.txt", "nothing");
        write(dir.path(), "vendors/README.md", "# vendors");
        write(dir.path(), "vendors/sunlu/index.yml", "name: Sunlu\n");

        let items = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "sunlu");
    }

    #[test]
    fn test_document_id_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendors/a.yaml", "id: spectrum\nname: Spectrum\n");

        let items = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap();

        assert_eq!(items[0].id, "spectrum");
        assert!(!items[0].fields.contains_key("id"));
    }

    #[test]
    fn test_unparsable_document_aborts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendors/ok.yaml", "name: Ok\n");
        write(dir.path(), "vendors/broken.yaml", "name: [unclosed\n");

        let err = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap_err();

        assert!(matches!(err, CatalogError::Parse { ref path, .. } if path.ends_with("broken.yaml")));
    }

    #[test]
    fn test_scalar_document_is_not_a_mapping() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendors/scalar.yaml", "just a string\n");

        let err = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap_err();

        assert!(matches!(err, CatalogError::NotAMapping { .. }));
    }

    #[test]
    fn test_duplicate_ids_abort() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "vendors/creality/index.yaml", "name: Creality\n");
        write(dir.path(), "vendors/creality.yaml", "name: Creality again\n");

        let err = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap_err();

        assert!(matches!(err, CatalogError::DuplicateItem { ref id, .. } if id == "creality"));
    }

    #[test]
    fn test_missing_collection_dir_is_io_error() {
        let dir = TempDir::new().unwrap();

        let err = CatalogLoader::new(dir.path()).unwrap().load_collection(&vendors()).unwrap_err();

        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            CatalogLoader::with_patterns("db", &["[yaml"]),
            Err(CatalogError::Pattern(_))
        ));
    }
}
