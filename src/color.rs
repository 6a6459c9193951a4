// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Display color resolution
//!
//! A variant color is given as an explicit hex value, a RAL Classic code or
//! an estimated hex value. Exactly one of them is used, in that order.

use crate::types::Color;
use tracing::info;

/// Which color field a display color came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    /// `hex`
    Hex,
    /// `ral`, through the RAL Classic table
    Ral,
    /// `hexEstimate`
    Estimate,
}

impl Color {
    /// The field that decides the display color, if any is set
    #[must_use]
    pub fn source(&self) -> Option<ColorSource> {
        if self.hex.is_some() {
            Some(ColorSource::Hex)
        } else if self.ral.is_some() {
            Some(ColorSource::Ral)
        } else if self.hex_estimate.is_some() {
            Some(ColorSource::Estimate)
        } else {
            None
        }
    }

    /// Resolve the display color
    ///
    /// An unknown RAL code resolves to `None`; it never falls through to
    /// `hexEstimate`.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        match self.source()? {
            ColorSource::Hex => self.hex.clone(),
            ColorSource::Ral => {
                let code = self.ral.as_deref()?;
                let hex = ral_to_hex(code);
                if hex.is_none() {
                    info!(ral = %code, "RAL code not in lookup table, leaving color unresolved");
                }
                hex
            }
            ColorSource::Estimate => self.hex_estimate.clone(),
        }
    }
}

/// Resolve an optional variant color
#[must_use]
pub fn resolve_color(color: Option<&Color>) -> Option<String> {
    color.and_then(Color::resolve)
}

/// Look up a RAL Classic code such as `RAL 9005`, `RAL9005` or `9005`
#[must_use]
pub fn ral_to_hex(code: &str) -> Option<String> {
    let code = code.trim();
    let digits = code.strip_prefix("RAL").unwrap_or(code).trim();
    let number: u16 = digits.parse().ok()?;

    RAL_CLASSIC
        .binary_search_by_key(&number, |&(ral, _)| ral)
        .ok()
        .map(|idx| format!("#{}", hex::encode_upper(RAL_CLASSIC[idx].1)))
}

// Sorted by code.
const RAL_CLASSIC: &[(u16, [u8; 3])] = &[
    (1000, [0xBE, 0xBD, 0x7F]),
    (1001, [0xC2, 0xB0, 0x78]),
    (1002, [0xC6, 0xA6, 0x64]),
    (1003, [0xE5, 0xBE, 0x01]),
    (1004, [0xCD, 0xA4, 0x34]),
    (1005, [0xA9, 0x83, 0x07]),
    (1006, [0xE4, 0xA0, 0x10]),
    (1007, [0xDC, 0x9D, 0x00]),
    (1011, [0x8A, 0x66, 0x42]),
    (1012, [0xC7, 0xB4, 0x46]),
    (1013, [0xEA, 0xE6, 0xCA]),
    (1014, [0xE1, 0xCC, 0x4F]),
    (1015, [0xE6, 0xD6, 0x90]),
    (1016, [0xED, 0xFF, 0x21]),
    (1017, [0xF5, 0xD0, 0x33]),
    (1018, [0xF8, 0xF3, 0x2B]),
    (1019, [0x9E, 0x97, 0x64]),
    (1020, [0x99, 0x99, 0x50]),
    (1021, [0xF3, 0xDA, 0x0B]),
    (1023, [0xFA, 0xD2, 0x01]),
    (1024, [0xAE, 0xA0, 0x4B]),
    (1026, [0xFF, 0xFF, 0x00]),
    (1027, [0x9D, 0x91, 0x01]),
    (1028, [0xF4, 0xA9, 0x00]),
    (1032, [0xD6, 0xAE, 0x01]),
    (1033, [0xF3, 0xA5, 0x05]),
    (1034, [0xEF, 0xA9, 0x4A]),
    (1035, [0x6A, 0x5D, 0x4D]),
    (1036, [0x70, 0x53, 0x35]),
    (1037, [0xF3, 0x9F, 0x18]),
    (2000, [0xED, 0x76, 0x0E]),
    (2001, [0xC9, 0x3C, 0x20]),
    (2002, [0xCB, 0x28, 0x21]),
    (2003, [0xFF, 0x75, 0x14]),
    (2004, [0xF4, 0x46, 0x11]),
    (2005, [0xFF, 0x23, 0x01]),
    (2007, [0xFF, 0xA4, 0x20]),
    (2008, [0xF7, 0x5E, 0x25]),
    (2009, [0xF5, 0x40, 0x21]),
    (2010, [0xD8, 0x4B, 0x20]),
    (2011, [0xEC, 0x7C, 0x26]),
    (2012, [0xE5, 0x51, 0x37]),
    (2013, [0xC3, 0x58, 0x31]),
    (3000, [0xAF, 0x2B, 0x1E]),
    (3001, [0xA5, 0x20, 0x19]),
    (3002, [0xA2, 0x23, 0x1D]),
    (3003, [0x9B, 0x11, 0x1E]),
    (3004, [0x75, 0x15, 0x1E]),
    (3005, [0x5E, 0x21, 0x29]),
    (3007, [0x41, 0x22, 0x27]),
    (3009, [0x64, 0x24, 0x24]),
    (3011, [0x78, 0x1F, 0x19]),
    (3012, [0xC1, 0x87, 0x6B]),
    (3013, [0xA1, 0x23, 0x12]),
    (3014, [0xD3, 0x6E, 0x70]),
    (3015, [0xEA, 0x89, 0x9A]),
    (3016, [0xB3, 0x28, 0x21]),
    (3017, [0xE6, 0x32, 0x44]),
    (3018, [0xD5, 0x30, 0x32]),
    (3020, [0xCC, 0x06, 0x05]),
    (3022, [0xD9, 0x50, 0x30]),
    (3024, [0xF8, 0x00, 0x00]),
    (3026, [0xFE, 0x00, 0x00]),
    (3027, [0xC5, 0x1D, 0x34]),
    (3028, [0xCB, 0x32, 0x34]),
    (3031, [0xB3, 0x24, 0x28]),
    (3032, [0x72, 0x14, 0x22]),
    (3033, [0xB4, 0x4C, 0x43]),
    (4001, [0x6D, 0x3F, 0x5B]),
    (4002, [0x92, 0x2B, 0x3E]),
    (4003, [0xDE, 0x4C, 0x8A]),
    (4004, [0x64, 0x1C, 0x34]),
    (4005, [0x6C, 0x46, 0x75]),
    (4006, [0xA0, 0x34, 0x72]),
    (4007, [0x4A, 0x19, 0x2C]),
    (4008, [0x92, 0x4E, 0x7D]),
    (4009, [0xA1, 0x85, 0x94]),
    (4010, [0xCF, 0x34, 0x76]),
    (4011, [0x86, 0x73, 0xA1]),
    (4012, [0x6C, 0x68, 0x74]),
    (5000, [0x35, 0x4D, 0x73]),
    (5001, [0x1F, 0x34, 0x38]),
    (5002, [0x20, 0x21, 0x4F]),
    (5003, [0x1D, 0x1E, 0x33]),
    (5004, [0x18, 0x17, 0x1C]),
    (5005, [0x1E, 0x24, 0x60]),
    (5007, [0x3E, 0x5F, 0x8A]),
    (5008, [0x26, 0x25, 0x2D]),
    (5009, [0x02, 0x56, 0x69]),
    (5010, [0x0E, 0x29, 0x4B]),
    (5011, [0x23, 0x1A, 0x24]),
    (5012, [0x3B, 0x83, 0xBD]),
    (5013, [0x1E, 0x21, 0x3D]),
    (5014, [0x60, 0x6E, 0x8C]),
    (5015, [0x22, 0x71, 0xB3]),
    (5017, [0x06, 0x39, 0x71]),
    (5018, [0x3F, 0x88, 0x8F]),
    (5019, [0x1B, 0x55, 0x83]),
    (5020, [0x1D, 0x33, 0x4A]),
    (5021, [0x25, 0x6D, 0x7B]),
    (5022, [0x25, 0x28, 0x50]),
    (5023, [0x49, 0x67, 0x8D]),
    (5024, [0x5D, 0x9B, 0x9B]),
    (5025, [0x2A, 0x64, 0x78]),
    (5026, [0x10, 0x2C, 0x54]),
    (6000, [0x31, 0x66, 0x50]),
    (6001, [0x28, 0x72, 0x33]),
    (6002, [0x2D, 0x57, 0x2C]),
    (6003, [0x42, 0x46, 0x32]),
    (6004, [0x1F, 0x3A, 0x3D]),
    (6005, [0x2F, 0x45, 0x38]),
    (6006, [0x3E, 0x3B, 0x32]),
    (6007, [0x34, 0x3B, 0x29]),
    (6008, [0x39, 0x35, 0x2A]),
    (6009, [0x31, 0x37, 0x2B]),
    (6010, [0x35, 0x68, 0x2D]),
    (6011, [0x58, 0x72, 0x46]),
    (6012, [0x34, 0x3E, 0x40]),
    (6013, [0x6C, 0x71, 0x56]),
    (6014, [0x47, 0x40, 0x2E]),
    (6015, [0x3B, 0x3C, 0x36]),
    (6016, [0x1E, 0x59, 0x45]),
    (6017, [0x4C, 0x91, 0x41]),
    (6018, [0x57, 0xA6, 0x39]),
    (6019, [0xBD, 0xEC, 0xB6]),
    (6020, [0x2E, 0x3A, 0x23]),
    (6021, [0x89, 0xAC, 0x76]),
    (6022, [0x25, 0x22, 0x1B]),
    (6024, [0x30, 0x84, 0x46]),
    (6025, [0x3D, 0x64, 0x2D]),
    (6026, [0x01, 0x5D, 0x52]),
    (6027, [0x84, 0xC3, 0xBE]),
    (6028, [0x2C, 0x55, 0x45]),
    (6029, [0x20, 0x60, 0x3D]),
    (6032, [0x31, 0x7F, 0x43]),
    (6033, [0x49, 0x7E, 0x76]),
    (6034, [0x7F, 0xB5, 0xB5]),
    (6035, [0x1C, 0x54, 0x2D]),
    (6036, [0x19, 0x37, 0x37]),
    (6037, [0x00, 0x8F, 0x39]),
    (6038, [0x00, 0xBB, 0x2D]),
    (7000, [0x78, 0x85, 0x8B]),
    (7001, [0x8A, 0x95, 0x97]),
    (7002, [0x7E, 0x7B, 0x52]),
    (7003, [0x6C, 0x70, 0x59]),
    (7004, [0x96, 0x99, 0x92]),
    (7005, [0x64, 0x6B, 0x63]),
    (7006, [0x6D, 0x65, 0x52]),
    (7008, [0x6A, 0x5F, 0x31]),
    (7009, [0x4D, 0x56, 0x45]),
    (7010, [0x4C, 0x51, 0x4A]),
    (7011, [0x43, 0x4B, 0x4D]),
    (7012, [0x4E, 0x57, 0x54]),
    (7013, [0x46, 0x45, 0x31]),
    (7015, [0x43, 0x47, 0x50]),
    (7016, [0x29, 0x31, 0x33]),
    (7021, [0x23, 0x28, 0x2B]),
    (7022, [0x33, 0x2F, 0x2C]),
    (7023, [0x68, 0x6C, 0x5E]),
    (7024, [0x47, 0x4A, 0x51]),
    (7026, [0x2F, 0x35, 0x3B]),
    (7030, [0x8B, 0x8C, 0x7A]),
    (7031, [0x47, 0x4B, 0x4E]),
    (7032, [0xB8, 0xB7, 0x99]),
    (7033, [0x7D, 0x84, 0x71]),
    (7034, [0x8F, 0x8B, 0x66]),
    (7035, [0xD7, 0xD7, 0xD7]),
    (7036, [0x7F, 0x76, 0x79]),
    (7037, [0x7D, 0x7F, 0x7D]),
    (7038, [0xB5, 0xB8, 0xB1]),
    (7039, [0x6C, 0x69, 0x60]),
    (7040, [0x9D, 0xA1, 0xAA]),
    (7042, [0x8D, 0x94, 0x8D]),
    (7043, [0x4E, 0x54, 0x52]),
    (7044, [0xCA, 0xC4, 0xB0]),
    (7045, [0x90, 0x90, 0x90]),
    (7046, [0x82, 0x89, 0x8F]),
    (7047, [0xD0, 0xD0, 0xD0]),
    (7048, [0x89, 0x81, 0x76]),
    (8000, [0x82, 0x6C, 0x34]),
    (8001, [0x95, 0x5F, 0x20]),
    (8002, [0x6C, 0x3B, 0x2A]),
    (8003, [0x73, 0x42, 0x22]),
    (8004, [0x8E, 0x40, 0x2A]),
    (8007, [0x59, 0x35, 0x1F]),
    (8008, [0x6F, 0x4F, 0x28]),
    (8011, [0x5B, 0x3A, 0x29]),
    (8012, [0x59, 0x23, 0x21]),
    (8014, [0x38, 0x2C, 0x1E]),
    (8015, [0x63, 0x3A, 0x34]),
    (8016, [0x4C, 0x2F, 0x27]),
    (8017, [0x45, 0x32, 0x2E]),
    (8019, [0x40, 0x3A, 0x3A]),
    (8022, [0x21, 0x21, 0x21]),
    (8023, [0xA6, 0x5E, 0x2E]),
    (8024, [0x79, 0x55, 0x3D]),
    (8025, [0x75, 0x5C, 0x48]),
    (8028, [0x4E, 0x3B, 0x31]),
    (8029, [0x76, 0x3C, 0x28]),
    (9001, [0xFD, 0xF4, 0xE3]),
    (9002, [0xE7, 0xEB, 0xDA]),
    (9003, [0xF4, 0xF4, 0xF4]),
    (9004, [0x28, 0x28, 0x28]),
    (9005, [0x0A, 0x0A, 0x0A]),
    (9006, [0xA5, 0xA5, 0xA5]),
    (9007, [0x8F, 0x8F, 0x8F]),
    (9010, [0xFF, 0xFF, 0xFF]),
    (9011, [0x1C, 0x1C, 0x1C]),
    (9016, [0xF6, 0xF6, 0xF6]),
    (9017, [0x1E, 0x1E, 0x1E]),
    (9018, [0xD7, 0xD7, 0xD7]),
    (9022, [0x9C, 0x9C, 0x9C]),
    (9023, [0x82, 0x82, 0x82]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn color(hex: Option<&str>, ral: Option<&str>, estimate: Option<&str>) -> Color {
        Color {
            hex: hex.map(String::from),
            ral: ral.map(String::from),
            hex_estimate: estimate.map(String::from),
            ..Color::default()
        }
    }

    #[test]
    fn test_table_is_sorted() {
        assert!(RAL_CLASSIC.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_ral_lookup_forms() {
        assert_eq!(ral_to_hex("RAL9005").as_deref(), Some("#0A0A0A"));
        assert_eq!(ral_to_hex("RAL 9005").as_deref(), Some("#0A0A0A"));
        assert_eq!(ral_to_hex("9010").as_deref(), Some("#FFFFFF"));
        assert_eq!(ral_to_hex(" 3020 ").as_deref(), Some("#CC0605"));
    }

    #[test]
    fn test_unknown_ral_is_none() {
        assert_eq!(ral_to_hex("RAL 1234"), None);
        assert_eq!(ral_to_hex("RAL"), None);
        assert_eq!(ral_to_hex("blue"), None);
    }

    #[test]
    fn test_hex_wins() {
        let c = color(Some("#112233"), Some("RAL9005"), Some("#445566"));
        assert_eq!(c.source(), Some(ColorSource::Hex));
        assert_eq!(c.resolve().as_deref(), Some("#112233"));
    }

    #[test]
    fn test_ral_before_estimate() {
        let c = color(None, Some("RAL9005"), Some("#445566"));
        assert_eq!(c.resolve().as_deref(), Some("#0A0A0A"));
    }

    #[test]
    fn test_unknown_ral_does_not_fall_back() {
        let c = color(None, Some("RAL 1234"), Some("#445566"));
        assert_eq!(c.source(), Some(ColorSource::Ral));
        assert_eq!(c.resolve(), None);
    }

    #[test]
    fn test_estimate_and_absent() {
        assert_eq!(color(None, None, Some("#445566")).resolve().as_deref(), Some("#445566"));
        assert_eq!(color(None, None, None).resolve(), None);
        assert_eq!(resolve_color(None), None);
    }
}
