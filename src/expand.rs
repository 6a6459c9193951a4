// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Filament expansion into the materials index and the flattened catalog

use crate::color::resolve_color;
use crate::error::CatalogError;
use crate::loader::CatalogLoader;
use crate::size_key::parse_size_key;
use crate::types::{
    BuildOutput, CatalogRecord, CollectionData, CollectionSpec, FilamentItem, RawItem, SizeRecord,
    Variant, MATERIALS,
};
use serde_json::{Map, Value};
use tracing::info;

/// The two outputs of expanding the filaments collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// One color-annotated record per item
    pub materials: Vec<FilamentItem>,
    /// One record per (item x variant)
    pub catalog: Vec<CatalogRecord>,
}

/// Expand loaded filament items
///
/// Catalog records own copies of every variant's sizes, images and color,
/// so later edits to the materials index never reach the catalog.
pub fn expand_filaments(items: Vec<RawItem>) -> Result<Expansion, CatalogError> {
    let mut expansion = Expansion::default();

    for raw in items {
        let mut item = filament_item(raw)?;
        annotate_colors(&mut item);

        for variant in &item.variants {
            expansion.catalog.push(flatten_variant(&item, variant)?);
        }
        expansion.materials.push(item);
    }

    Ok(expansion)
}

/// Decode a loaded item as a filament definition
pub fn filament_item(raw: RawItem) -> Result<FilamentItem, CatalogError> {
    let id = raw.id.clone();
    serde_json::to_value(raw)
        .and_then(serde_json::from_value)
        .map_err(|source| CatalogError::InvalidItem { id, source })
}

/// Set `hexColorCalc` on every variant
pub fn annotate_colors(item: &mut FilamentItem) {
    for variant in &mut item.variants {
        variant.hex_color_calc = resolve_color(variant.color.as_ref());
    }
}

// Record fields set from the item or the size key; variant data never overrides them.
const CATALOG_RECORD_KEYS: &[&str] = &[
    "material",
    "diameterTolerance",
    "parentName",
    "printParams",
    "collection",
    "vendor",
];
const SIZE_RECORD_KEYS: &[&str] = &["key", "sizeData"];

fn without(fields: &Map<String, Value>, reserved: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(k, _)| !reserved.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Build the catalog record of one variant
///
/// Item-level fields win over variant fields of the same name.
pub fn flatten_variant(item: &FilamentItem, variant: &Variant) -> Result<CatalogRecord, CatalogError> {
    let sizes = variant
        .sizes
        .iter()
        .map(|(key, size)| {
            let size_data = parse_size_key(key).map_err(|source| CatalogError::InvalidSize {
                item: item.id.clone(),
                variant: variant.name.clone(),
                source,
            })?;
            let mut size = size.clone();
            size.extra = without(&size.extra, SIZE_RECORD_KEYS);
            Ok(SizeRecord {
                key: key.clone(),
                size,
                size_data,
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    Ok(CatalogRecord {
        fid: variant.fid.clone(),
        name: format!("{} {}", item.name, variant.name),
        color: variant.color.clone(),
        images: variant.images.clone(),
        sizes,
        hex_color_calc: variant.hex_color_calc.clone(),
        material: item.material.clone(),
        diameter_tolerance: item.diameter_tolerance.clone(),
        parent_name: item.name.clone(),
        print_params: item.print_params.clone(),
        collection: item.id.clone(),
        vendor: item.vendor.clone(),
        extra: without(&variant.extra, CATALOG_RECORD_KEYS),
    })
}

/// Load and expand every declared collection
pub fn build(loader: &CatalogLoader, specs: &[CollectionSpec]) -> Result<BuildOutput, CatalogError> {
    if let Some(spec) = specs.iter().find(|s| s.id == MATERIALS) {
        return Err(CatalogError::ReservedCollection { id: spec.id.clone() });
    }

    let mut output = BuildOutput::default();

    for spec in specs {
        let items = loader.load_collection(spec)?;
        let data = if spec.is_filaments() {
            let expansion = expand_filaments(items)?;
            info!(
                "Expanded {} filaments into {} catalog records",
                expansion.materials.len(),
                expansion.catalog.len()
            );
            output.materials.extend(expansion.materials);
            CollectionData::Catalog(expansion.catalog)
        } else {
            CollectionData::Items(items)
        };
        output.collections.insert(spec.id.clone(), data);
    }

    Ok(output)
}
