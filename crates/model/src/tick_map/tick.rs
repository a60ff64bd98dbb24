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

use alloy_primitives::I256;
use clamm_core::ArithmeticError;
use serde::{Deserialize, Serialize};

use crate::{
    accum::growth::{GrowthSnapshot, TokenGrowth, cross_growth_outside, seed_growth_outside},
    identifiers::IncentiveId,
    tick_map::{
        liquidity_math::liquidity_math_add,
        tick_math::{MAX_TICK, MIN_TICK},
    },
};

/// A tick boundary of a concentrated-liquidity pool with its liquidity and growth-outside values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    /// The tick index.
    pub index: i32,
    /// Total liquidity referencing this tick as a boundary.
    pub liquidity_gross: u128,
    /// Net liquidity added when the price crosses this tick going up.
    pub liquidity_net: i128,
    /// Fee growth on the side of the tick away from the current price.
    pub fee_growth_outside: TokenGrowth,
    /// Incentive growth on the side of the tick away from the current price, per stream.
    pub incentive_growth_outside: BTreeMap<IncentiveId, I256>,
}

impl TickInfo {
    /// Creates a new empty [`TickInfo`] for the given index.
    #[must_use]
    pub fn new(index: i32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Returns true if any liquidity references this tick.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.liquidity_gross > 0
    }

    /// Returns the growth-outside of an incentive stream, zero if the stream never touched
    /// this tick.
    #[must_use]
    pub fn incentive_growth_outside(&self, incentive_id: IncentiveId) -> I256 {
        self.incentive_growth_outside
            .get(&incentive_id)
            .copied()
            .unwrap_or(I256::ZERO)
    }

    /// Updates liquidity amounts when positions are added/removed.
    ///
    /// Returns the gross liquidity before the update.
    ///
    /// # Panics
    ///
    /// Panics if the gross or net liquidity overflows.
    pub fn update_liquidity(&mut self, liquidity_delta: i128, upper: bool) -> u128 {
        let liquidity_gross_before = self.liquidity_gross;
        self.liquidity_gross = liquidity_math_add(self.liquidity_gross, liquidity_delta);

        if upper {
            self.liquidity_net -= liquidity_delta;
        } else {
            self.liquidity_net += liquidity_delta;
        }

        liquidity_gross_before
    }

    /// Seeds every stream's growth-outside for a tick touched for the first time.
    pub fn seed(&mut self, current_tick: i32, globals: &GrowthSnapshot) {
        self.fee_growth_outside = seed_growth_outside(self.index, current_tick, &globals.fee);
        self.incentive_growth_outside = globals
            .incentives
            .iter()
            .map(|(id, global)| (*id, seed_growth_outside(self.index, current_tick, global)))
            .collect();
    }

    /// Flips every stream's growth-outside to `global - outside` as the price crosses the tick.
    ///
    /// # Errors
    ///
    /// Returns an error if a subtraction overflows.
    pub fn cross(&mut self, globals: &GrowthSnapshot) -> Result<(), ArithmeticError> {
        self.fee_growth_outside = cross_growth_outside(&globals.fee, &self.fee_growth_outside)?;
        for (id, global) in &globals.incentives {
            let outside = self.incentive_growth_outside(*id);
            self.incentive_growth_outside
                .insert(*id, cross_growth_outside(global, &outside)?);
        }
        Ok(())
    }

    /// Gets maximum valid tick for given spacing.
    #[must_use]
    pub fn get_max_tick(tick_spacing: u32) -> i32 {
        let spacing = tick_spacing.max(1) as i32;
        (MAX_TICK / spacing) * spacing
    }

    /// Gets minimum valid tick for given spacing.
    #[must_use]
    pub fn get_min_tick(tick_spacing: u32) -> i32 {
        let spacing = tick_spacing.max(1) as i32;
        (MIN_TICK / spacing) * spacing
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use indexmap::IndexMap;
    use rstest::rstest;

    use super::*;

    fn small(value: u64) -> I256 {
        I256::from_raw(U256::from(value))
    }

    fn globals(fee0: u64, fee1: u64, incentive: u64) -> GrowthSnapshot {
        GrowthSnapshot {
            fee: TokenGrowth::new(small(fee0), small(fee1)),
            incentives: IndexMap::from([(IncentiveId::new(1), small(incentive))]),
        }
    }

    #[rstest]
    fn test_update_liquidity_add_remove() {
        let mut tick = TickInfo::new(100);

        tick.update_liquidity(1000, false);
        assert_eq!(tick.liquidity_gross, 1000);
        assert_eq!(tick.liquidity_net, 1000);
        assert!(tick.is_active());

        tick.update_liquidity(500, false);
        tick.update_liquidity(-300, false);
        assert_eq!(tick.liquidity_gross, 1200);
        assert_eq!(tick.liquidity_net, 1200);

        let before = tick.update_liquidity(-1200, false);
        assert_eq!(before, 1200);
        assert_eq!(tick.liquidity_gross, 0);
        assert_eq!(tick.liquidity_net, 0);
        assert!(!tick.is_active());
    }

    #[rstest]
    fn test_update_liquidity_upper_tick() {
        let mut tick = TickInfo::new(200);

        tick.update_liquidity(1000, true);
        assert_eq!(tick.liquidity_gross, 1000);
        assert_eq!(tick.liquidity_net, -1000);

        tick.update_liquidity(-500, true);
        assert_eq!(tick.liquidity_gross, 500);
        assert_eq!(tick.liquidity_net, -500);
    }

    #[rstest]
    #[case(5, true)]
    #[case(-5, true)]
    #[case(0, true)]
    #[case(-10, false)]
    fn test_seed_every_stream(#[case] current_tick: i32, #[case] seeded_with_global: bool) {
        let mut tick = TickInfo::new(-5);
        tick.seed(current_tick, &globals(15, 2, 9));

        if seeded_with_global {
            assert_eq!(tick.fee_growth_outside, TokenGrowth::new(small(15), small(2)));
            assert_eq!(tick.incentive_growth_outside(IncentiveId::new(1)), small(9));
        } else {
            assert_eq!(tick.fee_growth_outside, TokenGrowth::default());
            assert_eq!(tick.incentive_growth_outside(IncentiveId::new(1)), I256::ZERO);
        }
    }

    #[rstest]
    fn test_cross_flips_every_stream() {
        let mut tick = TickInfo::new(2);
        tick.fee_growth_outside = TokenGrowth::new(small(1), small(2));
        tick.incentive_growth_outside
            .insert(IncentiveId::new(1), small(3));

        tick.cross(&globals(7, 9, 10)).unwrap();

        assert_eq!(tick.fee_growth_outside, TokenGrowth::new(small(6), small(7)));
        assert_eq!(tick.incentive_growth_outside(IncentiveId::new(1)), small(7));
    }

    #[rstest]
    fn test_cross_reads_missing_stream_as_zero() {
        let mut tick = TickInfo::new(2);
        tick.cross(&globals(0, 0, 10)).unwrap();
        assert_eq!(tick.incentive_growth_outside(IncentiveId::new(1)), small(10));
        assert_eq!(tick.incentive_growth_outside(IncentiveId::new(2)), I256::ZERO);
    }

    #[rstest]
    #[case(1, 887272)]
    #[case(10, 887270)]
    #[case(60, 887220)]
    #[case(200, 887200)]
    fn test_tick_spacing_bounds(#[case] tick_spacing: u32, #[case] expected: i32) {
        let max_tick = TickInfo::get_max_tick(tick_spacing);
        let min_tick = TickInfo::get_min_tick(tick_spacing);
        assert_eq!(max_tick, expected);
        assert_eq!(min_tick, -expected);
        assert_eq!(max_tick % tick_spacing as i32, 0);
        assert!(max_tick <= MAX_TICK);
        assert!(min_tick >= MIN_TICK);
    }
}
