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

//! The liquidity manager: position lifecycle, fee and incentive collection, and the swap walker.
//!
//! Every public operation loads a working copy of the pool's [`PoolLedger`], applies all of its
//! steps to that copy, performs the custody transfer and only then writes the copy back. A failure
//! at any step leaves both the ledger and the custody balances untouched.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use indexmap::IndexMap;

use crate::{
    accum::{GrowthSnapshot, TokenAmounts},
    config::ClammConfig,
    custody::{Coin, Custody},
    error::ClammError,
    identifiers::{IncentiveId, PoolId, PositionKey},
    pool::{PoolLedger, PoolMetadata, PoolProvider, Position},
};

pub mod incentives;
pub mod lifecycle;
pub mod swap;


pub use crate::engine::lifecycle::{
    CreatedPosition, Withdrawal, is_initial_position, validate_ticks,
};

/// Entry point of the accounting core, generic over its pool metadata and custody collaborators.
#[derive(Debug)]
pub struct LiquidityManager<P: PoolProvider, C: Custody> {
    config: ClammConfig,
    pools: P,
    custody: C,
    ledgers: BTreeMap<PoolId, PoolLedger>,
}

impl<P: PoolProvider, C: Custody> LiquidityManager<P, C> {
    /// Creates a new [`LiquidityManager`] instance.
    #[must_use]
    pub fn new(config: ClammConfig, pools: P, custody: C) -> Self {
        Self {
            config,
            pools,
            custody,
            ledgers: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClammConfig {
        &self.config
    }

    /// Returns the pool provider.
    #[must_use]
    pub const fn pools(&self) -> &P {
        &self.pools
    }

    /// Returns the pool provider mutably.
    pub fn pools_mut(&mut self) -> &mut P {
        &mut self.pools
    }

    /// Returns the custody collaborator.
    #[must_use]
    pub const fn custody(&self) -> &C {
        &self.custody
    }

    /// Returns the custody collaborator mutably.
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    /// Returns the committed ledger of `pool_id`, if any operation touched the pool yet.
    #[must_use]
    pub fn ledger(&self, pool_id: PoolId) -> Option<&PoolLedger> {
        self.ledgers.get(&pool_id)
    }

    /// Returns the position of `owner` over `[lower_tick, upper_tick]`, if any.
    #[must_use]
    pub fn position(
        &self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
    ) -> Option<&Position> {
        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        self.ledgers
            .get(&pool_id)
            .and_then(|ledger| ledger.positions.get(&key))
    }

    /// Returns the liquidity currently in range for `pool_id`.
    #[must_use]
    pub fn active_liquidity(&self, pool_id: PoolId) -> u128 {
        self.ledgers
            .get(&pool_id)
            .map_or(0, PoolLedger::active_liquidity)
    }

    /// Returns the growth of every stream accrued inside `[lower_tick, upper_tick)`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool does not exist.
    /// - The range is invalid for the pool.
    /// - A growth subtraction overflows.
    pub fn growth_inside_range(
        &self,
        pool_id: PoolId,
        lower_tick: i32,
        upper_tick: i32,
    ) -> Result<GrowthSnapshot, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        validate_ticks(lower_tick, upper_tick, pool.tick_spacing)?;
        let ledger = self.working_ledger(&pool);
        Ok(ledger.growth_inside(lower_tick, upper_tick, pool.current_tick)?)
    }

    /// Returns the fees `collect_fees` would currently pay the position, without collecting.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool or the position does not exist.
    pub fn claimable_fees(
        &self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
    ) -> Result<TokenAmounts, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        let ledger = self
            .ledgers
            .get(&pool_id)
            .ok_or_else(|| ClammError::position_not_found(&key))?;
        let inside = ledger.growth_inside(lower_tick, upper_tick, pool.current_tick)?;
        ledger.fees.owed(&key, &inside.fee)
    }

    /// Returns the rewards `collect_incentives` would currently pay the position per stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool or the position does not exist.
    pub fn claimable_incentives(
        &self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
    ) -> Result<IndexMap<IncentiveId, Coin>, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        let ledger = self
            .ledgers
            .get(&pool_id)
            .ok_or_else(|| ClammError::position_not_found(&key))?;
        let inside = ledger.growth_inside(lower_tick, upper_tick, pool.current_tick)?;

        let mut claimable = IndexMap::with_capacity(ledger.incentives.len());
        for (id, stream) in &ledger.incentives {
            let growth = inside.incentives.get(id).copied().unwrap_or_default();
            let amount = stream.accumulator.owed(&key, &growth)?;
            claimable.insert(
                *id,
                Coin {
                    denom: stream.denom,
                    amount,
                },
            );
        }
        Ok(claimable)
    }

    /// Returns a working copy of the pool's ledger, a fresh one if the pool was never touched.
    fn working_ledger(&self, pool: &PoolMetadata) -> PoolLedger {
        self.ledgers.get(&pool.id).cloned().unwrap_or_else(|| {
            PoolLedger::new(
                pool.id,
                pool.tick_spacing,
                self.config.enforce_max_liquidity_per_tick,
            )
        })
    }

    fn commit(&mut self, ledger: PoolLedger) {
        self.ledgers.insert(ledger.pool_id, ledger);
    }

    fn transfer(&mut self, from: Address, to: Address, coins: &[Coin]) -> Result<(), ClammError> {
        self.custody.transfer(from, to, coins)?;
        Ok(())
    }
}
