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

use std::collections::BTreeMap;

use clamm_core::ArithmeticError;

use crate::{
    accum::growth::{GrowthSnapshot, growth_inside},
    error::ClammError,
    tick_map::{
        liquidity_math::{liquidity_math_add, tick_spacing_to_max_liquidity_per_tick},
        tick::TickInfo,
        tick_math::{MAX_TICK, MIN_TICK},
    },
};

pub mod liquidity_math;
pub mod sqrt_price_math;
pub mod tick;
pub mod tick_math;

/// The tick store of one pool.
///
/// Ticks are kept ordered by index so the swap walker can find the next initialized tick in
/// either direction. Ticks no position references any more are cleared by the operation that
/// released them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMap {
    /// Mapping of tick indices to tick data
    ticks: BTreeMap<i32, TickInfo>,
    /// Current active liquidity
    pub liquidity: u128,
    /// Maximum gross liquidity a single tick may reference, `None` when not enforced.
    pub max_liquidity_per_tick: Option<u128>,
}

impl Default for TickMap {
    fn default() -> Self {
        Self::new(1, true)
    }
}

impl TickMap {
    /// Creates a new [`TickMap`] with the specified tick spacing.
    #[must_use]
    pub fn new(tick_spacing: u32, enforce_max_liquidity_per_tick: bool) -> Self {
        Self {
            ticks: BTreeMap::new(),
            liquidity: 0,
            max_liquidity_per_tick: enforce_max_liquidity_per_tick
                .then(|| tick_spacing_to_max_liquidity_per_tick(tick_spacing)),
        }
    }

    /// Retrieves a reference to the tick data at the specified tick index.
    #[must_use]
    pub fn get_tick(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    /// Sets the tick data for a specific tick index.
    pub fn set_tick(&mut self, tick_data: TickInfo) {
        self.ticks.insert(tick_data.index, tick_data);
    }

    /// Clears all data in a tick by removing it from the tick map.
    pub fn clear(&mut self, tick: i32) {
        self.ticks.remove(&tick);
    }

    /// Returns the number of ticks stored in the map.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    /// Returns the number of ticks referenced by at least one position.
    #[must_use]
    pub fn active_tick_count(&self) -> usize {
        self.ticks.values().filter(|tick| tick.is_active()).count()
    }

    /// Returns an iterator over the stored ticks in ascending index order.
    pub fn ticks(&self) -> impl Iterator<Item = &TickInfo> {
        self.ticks.values()
    }

    /// Applies a position's liquidity delta to one of its boundary ticks.
    ///
    /// A tick touched for the first time is seeded from `globals`. Returns whether the tick
    /// flipped between referenced and unreferenced. A tick flipped off keeps its growth-outside
    /// until the caller has read the range's growth inside and calls [`Self::clear`].
    ///
    /// # Errors
    ///
    /// Returns an error if the gross liquidity would exceed the per-tick maximum.
    ///
    /// # Panics
    ///
    /// Panics if the gross liquidity underflows.
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        upper: bool,
        globals: &GrowthSnapshot,
    ) -> Result<bool, ClammError> {
        let liquidity_gross_before = self.ticks.get(&tick).map_or(0, |t| t.liquidity_gross);
        let liquidity_gross_after = liquidity_math_add(liquidity_gross_before, liquidity_delta);

        if let Some(max) = self.max_liquidity_per_tick
            && liquidity_gross_after > max
        {
            return Err(ClammError::MaxLiquidityPerTickExceeded {
                tick,
                liquidity_gross: liquidity_gross_after,
                max,
            });
        }

        let tick_data = self
            .ticks
            .entry(tick)
            .or_insert_with(|| TickInfo::new(tick));
        if liquidity_gross_before == 0 {
            // All growth before initialization is assumed to have happened below the tick
            tick_data.seed(tick_current, globals);
        }
        tick_data.update_liquidity(liquidity_delta, upper);

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);
        if flipped {
            tracing::debug!("Tick {tick} flipped (liquidity_gross={liquidity_gross_after})");
        }
        Ok(flipped)
    }

    /// Crosses a tick during a swap, flipping the growth-outside of every stream.
    ///
    /// Returns the tick as updated. An unreferenced tick has nothing to flip and is returned
    /// empty without being stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a growth subtraction overflows.
    pub fn cross_tick(
        &mut self,
        tick: i32,
        globals: &GrowthSnapshot,
    ) -> Result<TickInfo, ArithmeticError> {
        match self.ticks.get_mut(&tick) {
            Some(tick_data) => {
                tick_data.cross(globals)?;
                tracing::debug!(
                    "Crossed tick {tick} (liquidity_net={})",
                    tick_data.liquidity_net
                );
                Ok(tick_data.clone())
            }
            None => Ok(TickInfo::new(tick)),
        }
    }

    /// Finds the next initialized tick from `tick`.
    ///
    /// With `lte` the search returns the greatest initialized tick at or below `tick`, otherwise
    /// the smallest initialized tick strictly above it. When there is none the result is clamped
    /// to [`MIN_TICK`] or [`MAX_TICK`] and flagged as not initialized.
    #[must_use]
    pub fn next_initialized_tick(&self, tick: i32, lte: bool) -> (i32, bool) {
        let found = if lte {
            self.ticks.range(..=tick).rev().find(|(_, t)| t.is_active())
        } else {
            self.ticks
                .range(tick.saturating_add(1)..)
                .find(|(_, t)| t.is_active())
        };

        match found {
            Some((index, _)) => (*index, true),
            None if lte => (MIN_TICK, false),
            None => (MAX_TICK, false),
        }
    }

    /// Checks if a tick is referenced by any position.
    #[must_use]
    pub fn is_tick_initialized(&self, tick: i32) -> bool {
        self.ticks.get(&tick).is_some_and(TickInfo::is_active)
    }

    /// Calculates the growth inside `[lower_tick, upper_tick)` for every stream in `globals`.
    ///
    /// Unreferenced boundary ticks read as zero growth-outside.
    ///
    /// # Errors
    ///
    /// Returns an error if a growth subtraction overflows.
    pub fn growth_inside(
        &self,
        lower_tick: i32,
        upper_tick: i32,
        current_tick: i32,
        globals: &GrowthSnapshot,
    ) -> Result<GrowthSnapshot, ArithmeticError> {
        let lower = self.ticks.get(&lower_tick);
        let upper = self.ticks.get(&upper_tick);

        let fee = growth_inside(
            lower_tick,
            upper_tick,
            current_tick,
            &globals.fee,
            &lower.map(|t| t.fee_growth_outside).unwrap_or_default(),
            &upper.map(|t| t.fee_growth_outside).unwrap_or_default(),
        )?;

        let mut incentives = globals.incentives.clone();
        for (id, inside) in &mut incentives {
            let global = *inside;
            *inside = growth_inside(
                lower_tick,
                upper_tick,
                current_tick,
                &global,
                &lower.map(|t| t.incentive_growth_outside(*id)).unwrap_or_default(),
                &upper.map(|t| t.incentive_growth_outside(*id)).unwrap_or_default(),
            )?;
        }

        Ok(GrowthSnapshot { fee, incentives })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
