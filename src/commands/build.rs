// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Build command - loads the catalog source and writes the expanded index

use crate::config::Config;
use crate::expand;
use crate::loader::CatalogLoader;
use crate::types::{BuildOutput, MATERIALS};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File written into the output directory
pub const INDEX_FILE: &str = "index.json";

/// Run the build command
pub fn run(config: &Config, source: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let source = source.unwrap_or_else(|| config.source_dir.clone());
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());

    info!("Building catalog from {}", source.display());

    let bundle = build_catalog(config, &source)?;
    let path = write_index(&bundle, &output_dir)?;

    println!("Built catalog from {}:", source.display());
    for (id, data) in &bundle.collections {
        println!("  {:<16} {}", id, data.len());
    }
    println!("  {:<16} {}", MATERIALS, bundle.materials.len());
    println!();
    println!("Written to {}", path.display());

    Ok(())
}

/// Load and expand every configured collection under `source`
pub fn build_catalog(config: &Config, source: &Path) -> Result<BuildOutput> {
    let loader = CatalogLoader::with_patterns(source, &config.definition_patterns)
        .context("Invalid definition patterns")?;

    expand::build(&loader, &config.collections)
        .with_context(|| format!("Failed to build catalog from {}", source.display()))
}

/// Replace `<dir>/index.json` with the serialized build
pub fn write_index(bundle: &BuildOutput, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let path = dir.join(INDEX_FILE);
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove stale {}", path.display()))?;
    }

    let json = serde_json::to_string_pretty(bundle).context("Failed to serialize catalog")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
