// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! New-items report
//!
//! Text output prints a YAML `variants:` block per product, ready to be
//! pasted into the product definition.

use crate::types::Variant;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

/// New variants found for one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReport {
    /// Material id
    pub product: String,
    /// New variants with their fids
    pub variants: Vec<Variant>,
}

#[derive(Serialize)]
struct VariantsBlock<'a> {
    variants: &'a [Variant],
}

impl ProductReport {
    /// Header line for text output
    #[must_use]
    pub fn header(&self) -> String {
        format!("----->>> [{}] new items:", self.product)
    }

    /// The `variants:` YAML block
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&VariantsBlock { variants: &self.variants })
            .with_context(|| format!("Failed to serialize new items of {}", self.product))
    }
}

/// Render reports as text
pub fn render_text(reports: &[ProductReport], color: bool) -> Result<String> {
    let mut out = String::new();
    for report in reports {
        let header = report.header();
        if color {
            out.push_str(&header.bold().yellow().to_string());
        } else {
            out.push_str(&header);
        }
        out.push('\n');
        out.push_str(&report.to_yaml()?);
    }
    Ok(out)
}

/// Render reports as a JSON array
pub fn render_json(reports: &[ProductReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("Failed to serialize report to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    fn report() -> ProductReport {
        let mut blue = Variant::named("Blue");
        blue.fid = Some("x7k2p".into());
        blue.sizes.insert("1.75mm/1000g".into(), Size::with_sku("B1"));
        ProductReport { product: "pla-basic".into(), variants: vec![blue] }
    }

    #[test]
    fn test_text_report() {
        let text = render_text(&[report()], false).unwrap();

        assert!(text.starts_with("----->>> [pla-basic] new items:\nvariants:\n"));
        assert!(text.contains("fid: x7k2p"));
        assert!(text.contains("1.75mm/1000g"));
        assert!(text.contains("sku: B1"));
        assert!(!text.contains("hexColorCalc"));
    }

    #[test]
    fn test_colored_header_keeps_text() {
        let text = render_text(&[report()], true).unwrap();
        assert!(text.contains("[pla-basic] new items:"));
        assert!(text.contains('\u{1b}'));
    }

    #[test]
    fn test_json_report() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&[report()]).unwrap()).unwrap();
        assert_eq!(json[0]["product"], "pla-basic");
        assert_eq!(json[0]["variants"][0]["sizes"]["1.75mm/1000g"]["sku"], "B1");
    }

    #[test]
    fn test_empty_reports_render_nothing() {
        assert_eq!(render_text(&[], false).unwrap(), "");
    }
}
