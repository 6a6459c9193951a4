// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Variant reconciliation
//!
//! Decides, for each scraped candidate, whether the materials index already
//! has it, whether it is another size of a color found earlier in the same
//! run, or whether it is a new color.
//!
//! Identity is the SKU or EAN. Names are only used to group sizes of a color
//! that is itself new in this run; a new SKU whose name equals an existing
//! catalog variant is still reported as new, since vendors reuse display
//! names across different products.

use crate::fid::FidGenerator;
use crate::types::{Candidate, Size, Variant};
use indexmap::IndexMap;
use serde_json::Map;

/// The identifiers of a size that can be matched on
///
/// Absent, empty and whitespace-only values are not identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity<'a> {
    /// Populated SKU
    pub sku: Option<&'a str>,
    /// Populated EAN
    pub ean: Option<&'a str>,
}

impl<'a> Identity<'a> {
    /// Identity of a size
    #[must_use]
    pub fn of(size: &'a Size) -> Self {
        Self {
            sku: populated(size.sku.as_deref()),
            ean: populated(size.ean.as_deref()),
        }
    }

    /// No usable identifier
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sku.is_none() && self.ean.is_none()
    }

    /// Whether `size` carries the same SKU or the same EAN
    #[must_use]
    pub fn matches(&self, size: &Size) -> bool {
        let same = |ours: Option<&str>, theirs: Option<&String>| {
            ours.is_some_and(|ours| populated(theirs.map(String::as_str)) == Some(ours))
        };
        same(self.sku, size.sku.as_ref()) || same(self.ean, size.ean.as_ref())
    }

    /// Whether any of `sizes` matches
    pub fn found_in<'s>(&self, mut sizes: impl Iterator<Item = &'s Size>) -> bool {
        !self.is_empty() && sizes.any(|size| self.matches(size))
    }
}

fn populated(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Candidate {
    /// Identity of the candidate's primary size
    #[must_use]
    pub fn identity(&self) -> Identity<'_> {
        self.primary_size()
            .map(|(_, size)| Identity::of(size))
            .unwrap_or_default()
    }
}

/// New variants discovered while reconciling one product
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    entries: Vec<Variant>,
}

impl Accumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// New variants so far, in discovery order
    #[must_use]
    pub fn entries(&self) -> &[Variant] {
        &self.entries
    }

    /// Number of new variants
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing new was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything found so far
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Take the new variants
    #[must_use]
    pub fn into_variants(self) -> Vec<Variant> {
        self.entries
    }
}

/// What reconciling one candidate did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// SKU/EAN already in the materials index
    Known,
    /// Same color and identifier already found in this run
    Duplicate,
    /// Added as another size of a color found in this run
    Merged {
        /// Fid of the entry that received the size
        fid: Option<String>,
    },
    /// Added as a new color
    Added {
        /// Freshly assigned fid
        fid: String,
        /// Whether the candidate carried a SKU or EAN
        identified: bool,
    },
}

/// Reconcile one candidate against a product's existing variants
pub fn reconcile<G: FidGenerator + ?Sized>(
    candidate: &Candidate,
    existing: &[Variant],
    accumulator: &mut Accumulator,
    fids: &mut G,
) -> Outcome {
    let identity = candidate.identity();

    if identity.found_in(existing.iter().flat_map(|v| v.sizes.values())) {
        return Outcome::Known;
    }

    if let Some(entry) = accumulator
        .entries
        .iter_mut()
        .find(|e| e.name == candidate.name)
    {
        if identity.found_in(entry.sizes.values()) {
            return Outcome::Duplicate;
        }
        merge_into(entry, candidate);
        return Outcome::Merged { fid: entry.fid.clone() };
    }

    let fid = fids.next_fid();
    accumulator.entries.push(Variant {
        fid: Some(fid.clone()),
        name: candidate.name.clone(),
        color: candidate.color.clone(),
        sizes: candidate.sizes.clone(),
        images: candidate.images.clone(),
        hex_color_calc: None,
        extra: Map::new(),
    });

    Outcome::Added {
        fid,
        identified: !identity.is_empty(),
    }
}

/// Reconcile every candidate of one product with a fresh accumulator
pub fn reconcile_all<G: FidGenerator + ?Sized>(
    candidates: &[Candidate],
    existing: &[Variant],
    fids: &mut G,
) -> Accumulator {
    let mut accumulator = Accumulator::new();
    for candidate in candidates {
        reconcile(candidate, existing, &mut accumulator, fids);
    }
    accumulator
}

fn merge_into(entry: &mut Variant, candidate: &Candidate) {
    merge_sizes(&mut entry.sizes, &candidate.sizes);
    for image in &candidate.images {
        if !entry.images.iter().any(|i| i.url == image.url) {
            entry.images.push(image.clone());
        }
    }
}

fn merge_sizes(into: &mut IndexMap<String, Size>, from: &IndexMap<String, Size>) {
    for (key, size) in from {
        into.insert(key.clone(), size.clone());
    }
}
