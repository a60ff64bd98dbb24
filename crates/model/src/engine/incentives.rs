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

//! Incentive streams: registering reward denominations, funding them and collecting rewards.

use alloy_primitives::{Address, U256};
use indexmap::IndexMap;
use ustr::Ustr;

use crate::{
    accum::growth::growth_per_liquidity,
    custody::{Coin, Custody},
    engine::LiquidityManager,
    error::ClammError,
    identifiers::{IncentiveId, PoolId, PositionKey},
    pool::PoolProvider,
};

impl<P: PoolProvider, C: Custody> LiquidityManager<P, C> {
    /// Registers a new incentive stream paying `denom` to the pool's in-range liquidity.
    ///
    /// Live positions start earning from the stream immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool does not exist.
    pub fn create_incentive(
        &mut self,
        pool_id: PoolId,
        denom: &str,
    ) -> Result<IncentiveId, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        let mut ledger = self.working_ledger(&pool);
        let incentive_id = ledger.add_incentive(Ustr::from(denom))?;
        self.commit(ledger);

        tracing::info!("Created incentive {incentive_id} in pool {pool_id} paying {denom}");
        Ok(incentive_id)
    }

    /// Funds an incentive stream with `amount` of its denom, split over the active liquidity.
    ///
    /// The per-liquidity growth rounds down, the remainder stays in the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool or the stream does not exist.
    /// - The pool has no active liquidity.
    /// - The funder cannot pay `amount`.
    pub fn distribute_incentive(
        &mut self,
        pool_id: PoolId,
        incentive_id: IncentiveId,
        funder: Address,
        amount: U256,
    ) -> Result<(), ClammError> {
        let pool = self.pools.pool(pool_id)?;
        let mut ledger = self.working_ledger(&pool);
        let active_liquidity = ledger.active_liquidity();
        if active_liquidity == 0 {
            return Err(ClammError::NoActiveLiquidity { pool_id });
        }

        let growth = growth_per_liquidity(amount, active_liquidity)?;
        let stream = ledger.incentive_mut(incentive_id)?;
        stream.accumulator.add_to_global(&growth)?;
        let coin = Coin {
            denom: stream.denom,
            amount,
        };

        self.transfer(funder, pool.address(), std::slice::from_ref(&coin))?;
        self.commit(ledger);

        tracing::info!(
            "Distributed {amount} {} to incentive {incentive_id} in pool {pool_id} over {active_liquidity} liquidity",
            coin.denom
        );
        Ok(())
    }

    /// Claims and pays out the rewards earned by a position from every incentive stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool or the position does not exist.
    /// - The pool cannot pay the rewards.
    pub fn collect_incentives(
        &mut self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
    ) -> Result<IndexMap<IncentiveId, Coin>, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        let mut ledger = self.working_ledger(&pool);
        if !ledger.positions.contains_key(&key) {
            return Err(ClammError::position_not_found(&key));
        }

        let inside = ledger.growth_inside(lower_tick, upper_tick, pool.current_tick)?;
        let rewards = ledger.claim_incentives(&key, &inside)?;
        let coins: Vec<Coin> = rewards.values().cloned().collect();
        self.transfer(pool.address(), owner, &coins)?;
        self.commit(ledger);

        tracing::info!(
            "Collected incentives for position {key} from {} streams",
            rewards.len()
        );
        Ok(rewards)
    }
}
