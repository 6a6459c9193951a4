// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - prints the effective configuration

use crate::config::Config;
use anyhow::Result;

/// Print the whole configuration, or one key of it
pub fn run(config: &Config, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => {
            let value = config
                .get(key)?
                .ok_or_else(|| anyhow::anyhow!("Unknown or unset configuration key: {}", key))?;
            println!("{value}");
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
