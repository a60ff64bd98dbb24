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
use indexmap::IndexMap;
use ustr::Ustr;

use crate::{
    accum::{
        FeeAccumulator, GrowthSnapshot, IncentiveAccumulator, TokenAmounts, TokenGrowth,
        fee_accumulator_name, incentive_accumulator_name,
    },
    custody::Coin,
    error::ClammError,
    identifiers::{IncentiveId, PoolId, PositionKey},
    pool::position::Position,
    tick_map::TickMap,
};

/// An incentive stream: a reward denomination distributed to in-range liquidity.
#[derive(Clone, Debug, PartialEq)]
pub struct IncentiveStream {
    /// The reward denomination.
    pub denom: Ustr,
    /// The stream's growth accumulator.
    pub accumulator: IncentiveAccumulator,
}

/// All accounting state of one pool: ticks, active liquidity, accumulators and positions.
///
/// Operations clone the ledger, mutate the clone and write it back only once every step has
/// succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolLedger {
    /// The pool this ledger belongs to.
    pub pool_id: PoolId,
    /// The tick store, including the pool's active liquidity.
    pub ticks: TickMap,
    /// The fee stream.
    pub fees: FeeAccumulator,
    /// Incentive streams in creation order.
    pub incentives: IndexMap<IncentiveId, IncentiveStream>,
    /// Live positions.
    pub positions: BTreeMap<PositionKey, Position>,
    next_incentive_id: u64,
}

impl PoolLedger {
    /// Creates a new empty [`PoolLedger`] instance.
    #[must_use]
    pub fn new(pool_id: PoolId, tick_spacing: u32, enforce_max_liquidity_per_tick: bool) -> Self {
        Self {
            pool_id,
            ticks: TickMap::new(tick_spacing, enforce_max_liquidity_per_tick),
            fees: FeeAccumulator::new(fee_accumulator_name(pool_id)),
            incentives: IndexMap::new(),
            positions: BTreeMap::new(),
            next_incentive_id: 1,
        }
    }

    /// Returns the liquidity currently in range.
    #[must_use]
    pub const fn active_liquidity(&self) -> u128 {
        self.ticks.liquidity
    }

    /// Returns the global growth of every stream.
    #[must_use]
    pub fn global_growth(&self) -> GrowthSnapshot {
        GrowthSnapshot {
            fee: *self.fees.value(),
            incentives: self
                .incentives
                .iter()
                .map(|(id, stream)| (*id, *stream.accumulator.value()))
                .collect(),
        }
    }

    /// Returns the growth inside `[lower_tick, upper_tick)` of every stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a growth subtraction overflows.
    pub fn growth_inside(
        &self,
        lower_tick: i32,
        upper_tick: i32,
        current_tick: i32,
    ) -> Result<GrowthSnapshot, ArithmeticError> {
        self.ticks
            .growth_inside(lower_tick, upper_tick, current_tick, &self.global_growth())
    }

    /// Adds per-unit fee growth on one token to the fee stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the growth is negative or the global growth overflows.
    pub fn charge_fee(&mut self, growth: I256, is_token_zero: bool) -> Result<(), ArithmeticError> {
        self.fees
            .add_to_global(&TokenGrowth::single(growth, is_token_zero))
    }

    /// Registers a new incentive stream and returns its id.
    ///
    /// Every live position gets a record in the new stream, earning from zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a position's liquidity does not fit a signed delta.
    pub fn add_incentive(&mut self, denom: Ustr) -> Result<IncentiveId, ClammError> {
        let incentive_id = IncentiveId::new(self.next_incentive_id);
        self.next_incentive_id += 1;

        let mut accumulator =
            IncentiveAccumulator::new(incentive_accumulator_name(self.pool_id, incentive_id));
        for (key, position) in &self.positions {
            let liquidity_delta =
                i128::try_from(position.liquidity).map_err(|_| ArithmeticError::Overflow)?;
            accumulator.initialize_position(*key);
            accumulator.update_position_liquidity(key, liquidity_delta, I256::ZERO)?;
        }

        self.incentives
            .insert(incentive_id, IncentiveStream { denom, accumulator });
        Ok(incentive_id)
    }

    /// Returns the incentive stream `incentive_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream does not exist.
    pub fn incentive(&self, incentive_id: IncentiveId) -> Result<&IncentiveStream, ClammError> {
        self.incentives
            .get(&incentive_id)
            .ok_or(ClammError::IncentiveNotFound {
                pool_id: self.pool_id,
                incentive_id,
            })
    }

    /// Returns the incentive stream `incentive_id` mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream does not exist.
    pub fn incentive_mut(
        &mut self,
        incentive_id: IncentiveId,
    ) -> Result<&mut IncentiveStream, ClammError> {
        let pool_id = self.pool_id;
        self.incentives
            .get_mut(&incentive_id)
            .ok_or(ClammError::IncentiveNotFound {
                pool_id,
                incentive_id,
            })
    }

    /// Creates records for `key` in every stream.
    pub fn initialize_position(&mut self, key: PositionKey) {
        self.fees.initialize_position(key);
        for stream in self.incentives.values_mut() {
            stream.accumulator.initialize_position(key);
        }
        self.positions.insert(key, Position::new(key));
    }

    /// Moves the value earned by `key` into its unclaimed balance in every stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the position has no record or an amount overflows.
    pub fn accrue(&mut self, key: &PositionKey, inside: &GrowthSnapshot) -> Result<(), ClammError> {
        self.fees.accrue(key, &inside.fee)?;
        for (id, stream) in &mut self.incentives {
            stream.accumulator.accrue(key, &incentive_inside(inside, *id))?;
        }
        Ok(())
    }

    /// Applies `liquidity_delta` to `key` in every stream and resets its snapshots to `inside`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position has no record.
    pub fn update_position_liquidity(
        &mut self,
        key: &PositionKey,
        liquidity_delta: i128,
        inside: &GrowthSnapshot,
    ) -> Result<(), ClammError> {
        self.fees
            .update_position_liquidity(key, liquidity_delta, inside.fee)?;
        for (id, stream) in &mut self.incentives {
            stream.accumulator.update_position_liquidity(
                key,
                liquidity_delta,
                incentive_inside(inside, *id),
            )?;
        }
        self.positions
            .get_mut(key)
            .ok_or_else(|| ClammError::position_not_found(key))?
            .update_liquidity(liquidity_delta);
        Ok(())
    }

    /// Claims the fees owed to `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the position has no record or an amount overflows.
    pub fn claim_fees(
        &mut self,
        key: &PositionKey,
        inside: &GrowthSnapshot,
    ) -> Result<TokenAmounts, ClammError> {
        self.fees.claim(key, &inside.fee)
    }

    /// Claims the rewards owed to `key` from every incentive stream, keyed by stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the position has no record or an amount overflows.
    pub fn claim_incentives(
        &mut self,
        key: &PositionKey,
        inside: &GrowthSnapshot,
    ) -> Result<IndexMap<IncentiveId, Coin>, ClammError> {
        let mut claimed = IndexMap::with_capacity(self.incentives.len());
        for (id, stream) in &mut self.incentives {
            let amount = stream
                .accumulator
                .claim(key, &incentive_inside(inside, *id))?;
            claimed.insert(
                *id,
                Coin {
                    denom: stream.denom,
                    amount,
                },
            );
        }
        Ok(claimed)
    }

    /// Deletes `key` from every stream and the position table.
    pub fn remove_position(&mut self, key: &PositionKey) {
        self.fees.remove_position(key);
        for stream in self.incentives.values_mut() {
            stream.accumulator.remove_position(key);
        }
        self.positions.remove(key);
    }
}

fn incentive_inside(inside: &GrowthSnapshot, incentive_id: IncentiveId) -> I256 {
    inside
        .incentives
        .get(&incentive_id)
        .copied()
        .unwrap_or(I256::ZERO)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};
    use clamm_core::math::Q128;
    use rstest::{fixture, rstest};

    use super::*;

    fn q128(units: u64) -> I256 {
        I256::from_raw(Q128 * U256::from(units))
    }

    #[fixture]
    fn key() -> PositionKey {
        PositionKey::new(PoolId::new(1), Address::repeat_byte(0x01), -100, 100)
    }

    #[fixture]
    fn ledger(key: PositionKey) -> PoolLedger {
        let mut ledger = PoolLedger::new(PoolId::new(1), 1, true);
        ledger.initialize_position(key);
        ledger
            .update_position_liquidity(&key, 500, &GrowthSnapshot::default())
            .unwrap();
        ledger
    }

    #[rstest]
    fn test_new_ledger_names_fee_stream() {
        let ledger = PoolLedger::new(PoolId::new(3), 10, true);
        assert_eq!(ledger.fees.name(), "fee/3");
        assert_eq!(ledger.active_liquidity(), 0);
        assert!(ledger.incentives.is_empty());
    }

    #[rstest]
    fn test_incentive_ids_are_sequential(mut ledger: PoolLedger) {
        let first = ledger.add_incentive(Ustr::from("uion")).unwrap();
        let second = ledger.add_incentive(Ustr::from("uosmo")).unwrap();
        assert_eq!(first, IncentiveId::new(1));
        assert_eq!(second, IncentiveId::new(2));
        assert_eq!(ledger.incentive(second).unwrap().accumulator.name(), "incentive/1/2");
    }

    #[rstest]
    fn test_new_incentive_covers_existing_positions(mut ledger: PoolLedger, key: PositionKey) {
        let incentive_id = ledger.add_incentive(Ustr::from("uion")).unwrap();
        let record = ledger
            .incentive(incentive_id)
            .unwrap()
            .accumulator
            .position(&key)
            .unwrap();
        assert_eq!(record.liquidity, 500);
        assert_eq!(record.snapshot, I256::ZERO);
    }

    #[rstest]
    fn test_unknown_incentive_is_error(ledger: PoolLedger) {
        assert!(matches!(
            ledger.incentive(IncentiveId::new(7)),
            Err(ClammError::IncentiveNotFound { .. })
        ));
    }

    #[rstest]
    fn test_claims_cover_every_stream(mut ledger: PoolLedger, key: PositionKey) {
        let incentive_id = ledger.add_incentive(Ustr::from("uion")).unwrap();
        ledger.charge_fee(q128(2), false).unwrap();
        ledger
            .incentive_mut(incentive_id)
            .unwrap()
            .accumulator
            .add_to_global(&q128(3))
            .unwrap();

        let inside = ledger.growth_inside(-100, 100, 0).unwrap();
        let fees = ledger.claim_fees(&key, &inside).unwrap();
        let incentives = ledger.claim_incentives(&key, &inside).unwrap();

        assert_eq!(fees, TokenAmounts::new(U256::ZERO, U256::from(1_000u64)));
        assert_eq!(
            incentives[&incentive_id],
            Coin::new("uion", U256::from(1_500u64))
        );
    }

    #[rstest]
    fn test_remove_position_clears_every_stream(mut ledger: PoolLedger, key: PositionKey) {
        let incentive_id = ledger.add_incentive(Ustr::from("uion")).unwrap();
        ledger.remove_position(&key);
        assert!(!ledger.fees.has_position(&key));
        assert!(
            !ledger
                .incentive(incentive_id)
                .unwrap()
                .accumulator
                .has_position(&key)
        );
        assert!(ledger.positions.is_empty());
    }
}
