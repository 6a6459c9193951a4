// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Filamentdb library - filament catalog builder and vendor reconciler
//!
//! This crate loads the per-product catalog definitions, expands them into
//! the flattened public catalog plus the materials index, and reconciles
//! freshly scraped vendor candidates against that index so that only new
//! colors, sizes and SKUs are reported.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod candidates;
pub mod color;
pub mod commands;
pub mod config;
pub mod error;
pub mod expand;
pub mod fid;
pub mod loader;
pub mod reconcile;
pub mod report;
pub mod size_key;

/// Core data types shared by the loader, expander and reconciler
pub mod types {
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::{Map, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// Id of the collection that gets expanded into the flattened catalog
    pub const FILAMENTS: &str = "filaments";

    /// Key under which the materials index is written in the build output
    pub const MATERIALS: &str = "materials";

    // =========================================================================
    // Collections
    // =========================================================================

    /// A declared catalog collection
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CollectionSpec {
        /// Collection id, also the name of its source directory
        pub id: String,
        /// Marks collections whose items are simple per-product definitions
        #[serde(default)]
        pub simple: bool,
    }

    impl CollectionSpec {
        /// Declare a collection
        #[must_use]
        pub fn new(id: impl Into<String>, simple: bool) -> Self {
            Self { id: id.into(), simple }
        }

        /// The default collection set
        #[must_use]
        pub fn defaults() -> Vec<Self> {
            vec![
                Self::new("base-materials", false),
                Self::new(FILAMENTS, true),
                Self::new("vendors", false),
            ]
        }

        /// Whether this collection is expanded into the flattened catalog
        #[must_use]
        pub fn is_filaments(&self) -> bool {
            self.id == FILAMENTS
        }
    }

    /// One loaded item of any collection
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RawItem {
        /// Item id (directory name or file stem unless the document sets one)
        pub id: String,
        /// Document fields, `id` excluded
        #[serde(flatten)]
        pub fields: Map<String, Value>,
    }

    impl RawItem {
        /// Build an item from a decoded document mapping
        #[must_use]
        pub fn from_document(id: &str, document: Map<String, Value>) -> Self {
            let mut own_id = None;
            let fields = document
                .into_iter()
                .filter_map(|(key, value)| {
                    if key == "id" {
                        own_id = Some(value);
                        None
                    } else {
                        Some((key, value))
                    }
                })
                .collect();

            let id = match own_id {
                Some(Value::String(s)) => s,
                Some(Value::Number(n)) => n.to_string(),
                _ => id.to_string(),
            };
            Self { id, fields }
        }
    }

    // =========================================================================
    // Filament definitions
    // =========================================================================

    /// Image reference
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Image {
        /// Image URL
        pub url: String,
        /// Any other image metadata
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    impl Image {
        /// Image with just a URL
        #[must_use]
        pub fn new(url: impl Into<String>) -> Self {
            Self { url: url.into(), extra: Map::new() }
        }
    }

    /// Color of a variant; at most one source is used for display
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Color {
        /// Explicit hex color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub hex: Option<String>,
        /// RAL Classic code, with or without the `RAL` prefix
        #[serde(default, deserialize_with = "opt_code", skip_serializing_if = "Option::is_none")]
        pub ral: Option<String>,
        /// Approximate hex color
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub hex_estimate: Option<String>,
        /// Any other color fields
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    /// One sellable diameter/weight of a variant
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Size {
        /// Shop link
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub link: Option<String>,
        /// Vendor SKU
        #[serde(default, deserialize_with = "opt_code", skip_serializing_if = "Option::is_none")]
        pub sku: Option<String>,
        /// EAN/GTIN barcode
        #[serde(default, deserialize_with = "opt_code", skip_serializing_if = "Option::is_none")]
        pub ean: Option<String>,
        /// Any other vendor metadata
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    impl Size {
        /// Size with a SKU
        #[must_use]
        pub fn with_sku(sku: impl Into<String>) -> Self {
            Self { sku: Some(sku.into()), ..Self::default() }
        }

        /// Size with an EAN
        #[must_use]
        pub fn with_ean(ean: impl Into<String>) -> Self {
            Self { ean: Some(ean.into()), ..Self::default() }
        }
    }

    /// One colorway of a filament item
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variant {
        /// Short unique identifier
        #[serde(default, deserialize_with = "opt_code", skip_serializing_if = "Option::is_none")]
        pub fid: Option<String>,
        /// Color name
        #[serde(deserialize_with = "code")]
        pub name: String,
        /// Color definition
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<Color>,
        /// Sizes keyed by `<diameter>mm/<weight>g[/<extra>]`, in document order
        #[serde(default)]
        pub sizes: IndexMap<String, Size>,
        /// Product images
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub images: Vec<Image>,
        /// Resolved display color, set in the materials index
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub hex_color_calc: Option<String>,
        /// Any other variant fields
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    impl Variant {
        /// Empty variant with a name
        #[must_use]
        pub fn named(name: impl Into<String>) -> Self {
            Self {
                fid: None,
                name: name.into(),
                color: None,
                sizes: IndexMap::new(),
                images: Vec::new(),
                hex_color_calc: None,
                extra: Map::new(),
            }
        }
    }

    /// Vendor page references of a filament item
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Refs {
        /// Product web page
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub web: Option<String>,
        /// Shop listing page
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub shop: Option<String>,
        /// Other references
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    /// A filament item as kept in the materials index
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FilamentItem {
        /// Item id
        pub id: String,
        /// Product line name
        #[serde(deserialize_with = "code")]
        pub name: String,
        /// Vendor id
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub vendor: Option<String>,
        /// Base material id
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub material: Option<String>,
        /// Diameter tolerance, copied to every catalog record
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub diameter_tolerance: Option<Arc<Value>>,
        /// Print parameters, copied to every catalog record
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub print_params: Option<Arc<Value>>,
        /// Vendor page references
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub refs: Option<Refs>,
        /// Colorways
        #[serde(default)]
        pub variants: Vec<Variant>,
        /// Any other item fields
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    // =========================================================================
    // Flattened catalog
    // =========================================================================

    /// Structured form of a size key
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SizeData {
        /// Filament diameter in millimetres
        #[serde(serialize_with = "number")]
        pub diameter: f64,
        /// Spool weight in grams
        #[serde(serialize_with = "number")]
        pub weight: f64,
        /// Optional third key segment
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub extra: Option<String>,
    }

    /// A size in the flattened catalog
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SizeRecord {
        /// Original size key
        pub key: String,
        /// Vendor metadata
        #[serde(flatten)]
        pub size: Size,
        /// Parsed size key
        pub size_data: SizeData,
    }

    /// One (item x variant) record of the public catalog
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CatalogRecord {
        /// Variant identifier
        #[serde(skip_serializing_if = "Option::is_none")]
        pub fid: Option<String>,
        /// `<item name> <variant name>`
        pub name: String,
        /// Variant color definition
        #[serde(skip_serializing_if = "Option::is_none")]
        pub color: Option<Color>,
        /// Variant images
        pub images: Vec<Image>,
        /// Expanded sizes
        pub sizes: Vec<SizeRecord>,
        /// Resolved display color
        pub hex_color_calc: Option<String>,
        /// Base material id
        pub material: Option<String>,
        /// Item diameter tolerance
        pub diameter_tolerance: Option<Arc<Value>>,
        /// Item name
        pub parent_name: String,
        /// Item print parameters
        pub print_params: Option<Arc<Value>>,
        /// Id of the item this record came from
        pub collection: String,
        /// Vendor id
        pub vendor: Option<String>,
        /// Remaining variant fields
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    /// Items of one collection in the build output
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(untagged)]
    pub enum CollectionData {
        /// Items carried through as loaded
        Items(Vec<RawItem>),
        /// Flattened filament catalog
        Catalog(Vec<CatalogRecord>),
    }

    impl CollectionData {
        /// Number of records
        #[must_use]
        pub fn len(&self) -> usize {
            match self {
                Self::Items(items) => items.len(),
                Self::Catalog(records) => records.len(),
            }
        }

        /// Whether there are no records
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    /// The complete build document
    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    pub struct BuildOutput {
        /// Collection id to its items
        #[serde(flatten)]
        pub collections: BTreeMap<String, CollectionData>,
        /// Materials index
        pub materials: Vec<FilamentItem>,
    }

    /// Read side of the build document used for reconciliation
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct MaterialsBundle {
        /// Materials index
        #[serde(default)]
        pub materials: Vec<FilamentItem>,
    }

    impl MaterialsBundle {
        /// Find a material by item id
        #[must_use]
        pub fn get(&self, id: &str) -> Option<&FilamentItem> {
            self.materials.iter().find(|m| m.id == id)
        }

        /// Materials sold by a vendor
        pub fn by_vendor<'a>(&'a self, vendor: &'a str) -> impl Iterator<Item = &'a FilamentItem> + 'a {
            self.materials
                .iter()
                .filter(move |m| m.vendor.as_deref() == Some(vendor))
        }

        /// Every fid already present in the index
        pub fn fids(&self) -> impl Iterator<Item = &str> {
            self.materials
                .iter()
                .flat_map(|m| m.variants.iter())
                .filter_map(|v| v.fid.as_deref())
        }
    }

    // =========================================================================
    // Scraper boundary
    // =========================================================================

    /// A freshly scraped observation of a product page
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Candidate {
        /// Color name as the vendor presents it
        #[serde(deserialize_with = "code")]
        pub name: String,
        /// Product images
        #[serde(default)]
        pub images: Vec<Image>,
        /// Observed sizes, normally exactly one
        #[serde(default)]
        pub sizes: IndexMap<String, Size>,
        /// Color, when the vendor publishes one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<Color>,
    }

    impl Candidate {
        /// Candidate with a single size
        #[must_use]
        pub fn new(name: impl Into<String>, size_key: impl Into<String>, size: Size) -> Self {
            let mut sizes = IndexMap::new();
            sizes.insert(size_key.into(), size);
            Self { name: name.into(), images: Vec::new(), sizes, color: None }
        }

        /// Add an image
        #[must_use]
        pub fn with_image(mut self, url: impl Into<String>) -> Self {
            self.images.push(Image::new(url));
            self
        }

        /// The size entry that identifies this candidate
        #[must_use]
        pub fn primary_size(&self) -> Option<(&String, &Size)> {
            self.sizes.iter().next()
        }
    }

    // =========================================================================
    // Lenient code fields
    // =========================================================================

    // YAML sources write SKUs, EANs and RAL codes as bare numbers.
    fn code_value<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(E::custom(format!("expected a string or number, found {other}"))),
        }
    }

    // Whole numbers are written without a fraction, `1000` rather than `1000.0`.
    #[allow(clippy::trivially_copy_pass_by_ref, clippy::float_cmp, clippy::cast_possible_truncation)]
    fn number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
            serializer.serialize_i64(*value as i64)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    fn opt_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        code_value(Value::deserialize(deserializer)?)
    }

    fn code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        code_value(Value::deserialize(deserializer)?)?
            .ok_or_else(|| D::Error::custom("expected a string or number, found null"))
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{CatalogError, SizeKeyError};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
