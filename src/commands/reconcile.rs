// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Reconcile command - reports scraped variants missing from the catalog

use crate::candidates::{CandidateSource, DirectoryCandidates};
use crate::config::Config;
use crate::fid::{FidGenerator, HashFidGenerator};
use crate::reconcile::{reconcile, Accumulator, Outcome};
use crate::report::{render_json, render_text, ProductReport};
use crate::types::{FilamentItem, MaterialsBundle};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::build::INDEX_FILE;

/// Which products to reconcile and where their candidates are
#[derive(Debug, Clone, Default)]
pub struct ReconcileArgs {
    /// Build output to read the materials index from
    pub bundle: Option<PathBuf>,
    /// Directory of candidate files
    pub candidates: Option<PathBuf>,
    /// Only products of this vendor
    pub vendor: Option<String>,
    /// Only this product
    pub product: Option<String>,
}

/// Run the reconcile command
pub fn run(config: &Config, args: ReconcileArgs, json: bool, color: bool) -> Result<()> {
    let bundle_path = args
        .bundle
        .unwrap_or_else(|| config.output_dir.join(INDEX_FILE));
    let candidates_dir = args
        .candidates
        .or_else(|| config.candidates_dir.clone())
        .ok_or_else(|| anyhow::anyhow!("No candidates directory. Pass --candidates or set candidates_dir"))?;

    let bundle = load_bundle(&bundle_path)?;
    let selected = select(&bundle, args.vendor.as_deref(), args.product.as_deref());

    if selected.is_empty() {
        eprintln!("Warning: no materials match the selection. Run 'filamentdb build' first?");
        return Ok(());
    }
    info!("Reconciling {} products", selected.len());

    let mut source = DirectoryCandidates::new(&candidates_dir);
    let mut fids = HashFidGenerator::from_clock().with_taken(bundle.fids());
    let reports = reconcile_products(selected, &mut source, &mut fids)?;

    let content = if json {
        render_json(&reports)?
    } else {
        render_text(&reports, color)?
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if json {
        stdout.write_all(b"\n")?;
    }

    if reports.is_empty() {
        info!("No new items");
    }

    Ok(())
}

/// Read the materials index from a build output file
pub fn load_bundle(path: &Path) -> Result<MaterialsBundle> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Materials matching the vendor and product filters
#[must_use]
pub fn select<'a>(
    bundle: &'a MaterialsBundle,
    vendor: Option<&str>,
    product: Option<&str>,
) -> Vec<&'a FilamentItem> {
    bundle
        .materials
        .iter()
        .filter(|m| vendor.map_or(true, |v| m.vendor.as_deref() == Some(v)))
        .filter(|m| product.map_or(true, |p| m.id == p))
        .collect()
}

/// Reconcile each product against its own candidates
///
/// Every product starts from an empty accumulator. Products the source has
/// no candidates for are skipped.
pub fn reconcile_products<'a, I, S, G>(
    materials: I,
    source: &mut S,
    fids: &mut G,
) -> Result<Vec<ProductReport>>
where
    I: IntoIterator<Item = &'a FilamentItem>,
    S: CandidateSource + ?Sized,
    G: FidGenerator + ?Sized,
{
    let mut reports = Vec::new();

    for material in materials {
        let Some(candidates) = source
            .candidates(material)
            .with_context(|| format!("Failed to collect candidates for {}", material.id))?
        else {
            warn!("No candidates for {}, skipping", material.id);
            continue;
        };

        let mut accumulator = Accumulator::new();
        let mut known = 0usize;

        for candidate in &candidates {
            match reconcile(candidate, &material.variants, &mut accumulator, fids) {
                Outcome::Known => known += 1,
                Outcome::Duplicate => debug!("[{}] duplicate observation of {}", material.id, candidate.name),
                Outcome::Merged { .. } => debug!("[{}] new size for {}", material.id, candidate.name),
                Outcome::Added { fid, identified } => {
                    if !identified {
                        warn!(
                            "[{}] {} has no SKU or EAN, reported as new ({}); check it by hand",
                            material.id, candidate.name, fid
                        );
                    }
                    debug!("[{}] new variant {} ({})", material.id, candidate.name, fid);
                }
            }
        }

        info!(
            "[{}] {} candidates, {} known, {} new variants",
            material.id,
            candidates.len(),
            known,
            accumulator.len()
        );

        if !accumulator.is_empty() {
            reports.push(ProductReport {
                product: material.id.clone(),
                variants: accumulator.into_variants(),
            });
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fid::SequenceFidGenerator;
    use crate::types::{Candidate, Size};
    use std::collections::BTreeMap;

    fn bundle() -> MaterialsBundle {
        serde_json::from_value(serde_json::json!({
            "materials": [
                {
                    "id": "pla", "name": "PLA", "vendor": "spectrum",
                    "variants": [{ "fid": "aaaaa", "name": "Red", "sizes": { "1.75mm/1000g": { "sku": "A1" } } }]
                },
                { "id": "petg", "name": "PETG", "vendor": "spectrum", "variants": [] },
                { "id": "asa", "name": "ASA", "vendor": "polymaker", "variants": [] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_select_by_vendor_and_product() {
        let bundle = bundle();
        assert_eq!(select(&bundle, Some("spectrum"), None).len(), 2);
        assert_eq!(select(&bundle, Some("spectrum"), Some("petg")).len(), 1);
        assert_eq!(select(&bundle, None, None).len(), 3);
        assert!(select(&bundle, Some("elegoo"), None).is_empty());
    }

    #[test]
    fn test_accumulator_is_per_product() {
        let bundle = bundle();
        let blue = Candidate::new("Blue", "1.75mm/1000g", Size::with_sku("B1"));
        let mut source = BTreeMap::from([
            ("pla".to_string(), vec![blue.clone()]),
            ("petg".to_string(), vec![blue]),
        ]);

        let reports = reconcile_products(
            select(&bundle, Some("spectrum"), None),
            &mut source,
            &mut SequenceFidGenerator::new("n"),
        )
        .unwrap();

        // The same color in another product is new there too
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].variants.len(), 1);
        assert_eq!(reports[1].variants.len(), 1);
        assert_ne!(reports[0].variants[0].fid, reports[1].variants[0].fid);
    }

    #[test]
    fn test_known_only_products_are_not_reported() {
        let bundle = bundle();
        let mut source = BTreeMap::from([(
            "pla".to_string(),
            vec![Candidate::new("Red", "1.75mm/1000g", Size::with_sku("A1"))],
        )]);

        let reports = reconcile_products(
            bundle.materials.iter(),
            &mut source,
            &mut SequenceFidGenerator::new("n"),
        )
        .unwrap();

        assert!(reports.is_empty());
    }
}
