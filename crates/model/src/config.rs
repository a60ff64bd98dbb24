// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Configuration of the accounting core.

use std::path::Path;

use clamm_core::correctness::{
    FAILED, check_in_range_right_exclusive_decimal, check_predicate_true, check_slice_not_empty,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::LiquidityManager`] and the pool provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClammConfig {
    /// Tick spacings a pool may be created with.
    pub authorized_tick_spacings: Vec<u32>,
    /// Fee rates a pool may be created with, each in `[0, 1)`.
    pub authorized_fee_rates: Vec<Decimal>,
    /// If the gross liquidity referencing a single tick is capped.
    pub enforce_max_liquidity_per_tick: bool,
}

impl Default for ClammConfig {
    /// Creates a new default [`ClammConfig`] instance.
    fn default() -> Self {
        Self {
            authorized_tick_spacings: vec![1, 10, 100, 1000],
            authorized_fee_rates: vec![
                dec!(0),
                dec!(0.0001),
                dec!(0.0005),
                dec!(0.001),
                dec!(0.002),
                dec!(0.003),
                dec!(0.005),
            ],
            enforce_max_liquidity_per_tick: true,
        }
    }
}

impl ClammConfig {
    /// Parses and validates a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails [`Self::validate`].
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No tick spacing or no fee rate is authorized.
    /// - A tick spacing is zero.
    /// - A fee rate is outside `[0, 1)`.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.check_fields().map_err(|e| anyhow::anyhow!("{FAILED}: {e}"))
    }

    fn check_fields(&self) -> anyhow::Result<()> {
        check_slice_not_empty(&self.authorized_tick_spacings, "authorized_tick_spacings")?;
        check_slice_not_empty(&self.authorized_fee_rates, "authorized_fee_rates")?;
        for tick_spacing in &self.authorized_tick_spacings {
            check_predicate_true(
                *tick_spacing > 0,
                "authorized tick spacings must be positive",
            )?;
        }
        for fee_rate in &self.authorized_fee_rates {
            check_in_range_right_exclusive_decimal(
                *fee_rate,
                Decimal::ZERO,
                Decimal::ONE,
                "authorized_fee_rates",
            )?;
        }
        Ok(())
    }

    /// Returns true if pools may be created with `tick_spacing`.
    #[must_use]
    pub fn is_authorized_tick_spacing(&self, tick_spacing: u32) -> bool {
        self.authorized_tick_spacings.contains(&tick_spacing)
    }

    /// Returns true if pools may be created with `fee_rate`.
    #[must_use]
    pub fn is_authorized_fee_rate(&self, fee_rate: Decimal) -> bool {
        self.authorized_fee_rates.contains(&fee_rate)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
