// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Catalog error types
//!
//! Every variant here is data corruption: the build stops and the message
//! names the offending source. Unresolved colors and rejected candidates are
//! normal outcomes and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// A size key that cannot be parsed into diameter and weight
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeKeyError {
    /// Key has no `/`-separated weight segment
    #[error("size key `{key}` has no weight segment")]
    MissingWeight {
        /// The offending key
        key: String,
    },

    /// A segment does not start with a number
    #[error("size key `{key}`: segment `{segment}` does not start with a number")]
    NoLeadingNumber {
        /// The offending key
        key: String,
        /// The segment that failed
        segment: String,
    },
}

/// Fatal catalog build errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading a directory or file failed
    #[error("failed to read {}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A YAML definition could not be parsed
    #[error("failed to parse {}", path.display())]
    Parse {
        /// Definition file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// A JSON definition could not be parsed
    #[error("failed to parse {}", path.display())]
    JsonParse {
        /// Definition file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A definition decoded to something other than a mapping
    #[error("{} does not contain a mapping", path.display())]
    NotAMapping {
        /// Definition file
        path: PathBuf,
    },

    /// Two definitions in one collection share an id
    #[error("duplicate item `{id}` in collection `{collection}` ({})", path.display())]
    DuplicateItem {
        /// Collection id
        collection: String,
        /// Item id
        id: String,
        /// Second definition with that id
        path: PathBuf,
    },

    /// A definition file pattern is not a valid glob
    #[error("invalid definition pattern")]
    Pattern(#[from] globset::Error),

    /// A collection id collides with the materials index key
    #[error("collection id `{id}` is reserved")]
    ReservedCollection {
        /// Collection id
        id: String,
    },

    /// A filament item does not have the filament shape
    #[error("invalid filament item `{id}`")]
    InvalidItem {
        /// Item id
        id: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A variant carries a malformed size key
    #[error("invalid size in filament `{item}`, variant `{variant}`")]
    InvalidSize {
        /// Item id
        item: String,
        /// Variant name
        variant: String,
        /// Underlying error
        #[source]
        source: SizeKeyError,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
