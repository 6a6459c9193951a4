// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Size key parsing
//!
//! Size keys look like `1.75mm/1000g` with an optional third segment, e.g.
//! `2.85mm/750g/refill`. Units are optional and ignored.

use crate::error::SizeKeyError;
use crate::types::SizeData;
use std::str::FromStr;

impl FromStr for SizeData {
    type Err = SizeKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        parse_size_key(key)
    }
}

/// Parse a size key into diameter, weight and extra segment
pub fn parse_size_key(key: &str) -> Result<SizeData, SizeKeyError> {
    let mut segments = key.splitn(3, '/');
    let diameter = segments.next().unwrap_or_default();
    let weight = segments
        .next()
        .ok_or_else(|| SizeKeyError::MissingWeight { key: key.to_string() })?;
    let extra = segments.next().map(str::to_string);

    Ok(SizeData {
        diameter: leading_number(key, diameter)?,
        weight: leading_number(key, weight)?,
        extra,
    })
}

/// Parse the leading run of digits and dots of a segment
fn leading_number(key: &str, segment: &str) -> Result<f64, SizeKeyError> {
    let trimmed = segment.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());

    trimmed[..end]
        .parse::<f64>()
        .map_err(|_| SizeKeyError::NoLeadingNumber {
            key: key.to_string(),
            segment: segment.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_units() {
        let data = parse_size_key("1.75mm/1000g").unwrap();
        assert_eq!(data.diameter, 1.75);
        assert_eq!(data.weight, 1000.0);
        assert_eq!(data.extra, None);
    }

    #[test]
    fn test_parse_without_units() {
        let data: SizeData = "2.85/750".parse().unwrap();
        assert_eq!(data.diameter, 2.85);
        assert_eq!(data.weight, 750.0);
    }

    #[test]
    fn test_parse_extra_segment() {
        let data = parse_size_key("1.75mm/1000g/refill").unwrap();
        assert_eq!(data.extra.as_deref(), Some("refill"));

        // Everything after the second slash belongs to the extra segment
        let data = parse_size_key("1.75mm/500g/cardboard/spool").unwrap();
        assert_eq!(data.extra.as_deref(), Some("cardboard/spool"));
    }

    #[test]
    fn test_empty_extra_is_kept() {
        let data = parse_size_key("1.75mm/1000g/").unwrap();
        assert_eq!(data.extra.as_deref(), Some(""));
    }

    #[test]
    fn test_missing_weight() {
        assert_eq!(
            parse_size_key("1.75mm"),
            Err(SizeKeyError::MissingWeight { key: "1.75mm".into() })
        );
    }

    #[test]
    fn test_segment_without_number() {
        let err = parse_size_key("mm/1000g").unwrap_err();
        assert!(matches!(err, SizeKeyError::NoLeadingNumber { ref segment, .. } if segment == "mm"));

        let err = parse_size_key("1.75mm/kg").unwrap_err();
        assert!(matches!(err, SizeKeyError::NoLeadingNumber { ref segment, .. } if segment == "kg"));
    }

    #[test]
    fn test_double_dot_is_malformed() {
        assert!(parse_size_key("1.7.5mm/1000g").is_err());
    }
}
