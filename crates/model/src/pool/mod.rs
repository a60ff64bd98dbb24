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

//! Pool metadata and the per-pool accounting ledger.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U160};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{config::ClammConfig, error::ClammError, identifiers::PoolId};

pub mod ledger;
pub mod position;

pub use crate::pool::{ledger::PoolLedger, position::Position};

/// Metadata of a concentrated-liquidity pool, owned by the pool provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMetadata {
    /// The pool identifier.
    pub id: PoolId,
    /// The first token of the pair.
    pub token0: Ustr,
    /// The second token of the pair.
    pub token1: Ustr,
    /// Ticks used as position boundaries must be multiples of this spacing.
    pub tick_spacing: u32,
    /// Fee rate charged on swap input.
    pub fee_rate: Decimal,
    /// The current tick.
    pub current_tick: i32,
    /// The current sqrt price (Q64.96), zero until the first position bootstraps the pool.
    pub sqrt_price: U160,
}

impl PoolMetadata {
    /// Creates a new [`PoolMetadata`] instance without a price.
    #[must_use]
    pub fn new(
        id: PoolId,
        token0: Ustr,
        token1: Ustr,
        tick_spacing: u32,
        fee_rate: Decimal,
    ) -> Self {
        Self {
            id,
            token0,
            token1,
            tick_spacing,
            fee_rate,
            current_tick: 0,
            sqrt_price: U160::ZERO,
        }
    }

    /// Returns the custody address holding the pool's reserves.
    #[must_use]
    pub fn address(&self) -> Address {
        self.id.address()
    }

    /// Returns true if `denom` is token0, false if it is token1.
    ///
    /// # Errors
    ///
    /// Returns an error if `denom` is not one of the pool's tokens.
    pub fn is_token_zero(&self, denom: Ustr) -> Result<bool, ClammError> {
        if denom == self.token0 {
            Ok(true)
        } else if denom == self.token1 {
            Ok(false)
        } else {
            Err(ClammError::DenomNotInPool {
                pool_id: self.id,
                denom,
            })
        }
    }
}

/// Supplies pool metadata to the accounting core.
pub trait PoolProvider {
    /// Returns the metadata of `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool does not exist.
    fn pool(&self, pool_id: PoolId) -> Result<PoolMetadata, ClammError>;

    /// Records a new price and current tick for `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool does not exist.
    fn update_price(
        &mut self,
        pool_id: PoolId,
        sqrt_price: U160,
        current_tick: i32,
    ) -> Result<(), ClammError>;
}

/// An in-memory [`PoolProvider`] that also creates pools.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPoolProvider {
    config: ClammConfig,
    pools: BTreeMap<PoolId, PoolMetadata>,
    next_pool_id: u64,
}

impl InMemoryPoolProvider {
    /// Creates a new empty [`InMemoryPoolProvider`] instance.
    #[must_use]
    pub fn new(config: ClammConfig) -> Self {
        Self {
            config,
            pools: BTreeMap::new(),
            next_pool_id: 1,
        }
    }

    /// Creates a pool without a price and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both tokens are the same denom.
    /// - The tick spacing or the fee rate is not authorized.
    pub fn create_pool(
        &mut self,
        token0: &str,
        token1: &str,
        tick_spacing: u32,
        fee_rate: Decimal,
    ) -> Result<PoolId, ClammError> {
        if token0 == token1 {
            return Err(ClammError::DuplicateDenom {
                denom: Ustr::from(token0),
            });
        }
        if !self.config.is_authorized_tick_spacing(tick_spacing) {
            return Err(ClammError::UnauthorizedTickSpacing { tick_spacing });
        }
        if !self.config.is_authorized_fee_rate(fee_rate) {
            return Err(ClammError::UnauthorizedFeeRate { fee_rate });
        }

        let pool_id = PoolId::new(self.next_pool_id.max(1));
        self.next_pool_id = pool_id.0 + 1;
        let pool = PoolMetadata::new(
            pool_id,
            Ustr::from(token0),
            Ustr::from(token1),
            tick_spacing,
            fee_rate,
        );
        tracing::info!("Created pool {pool_id} {token0}/{token1} (tick_spacing={tick_spacing}, fee_rate={fee_rate})");
        self.pools.insert(pool_id, pool);
        Ok(pool_id)
    }

    /// Inserts pool metadata as is.
    ///
    /// # Errors
    ///
    /// Returns an error if a pool with the same id exists.
    pub fn insert_pool(&mut self, pool: PoolMetadata) -> Result<(), ClammError> {
        if self.pools.contains_key(&pool.id) {
            return Err(ClammError::PoolAlreadyExists { pool_id: pool.id });
        }
        self.next_pool_id = self.next_pool_id.max(pool.id.0 + 1);
        self.pools.insert(pool.id, pool);
        Ok(())
    }
}

impl PoolProvider for InMemoryPoolProvider {
    fn pool(&self, pool_id: PoolId) -> Result<PoolMetadata, ClammError> {
        self.pools
            .get(&pool_id)
            .cloned()
            .ok_or(ClammError::PoolNotFound { pool_id })
    }

    fn update_price(
        &mut self,
        pool_id: PoolId,
        sqrt_price: U160,
        current_tick: i32,
    ) -> Result<(), ClammError> {
        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(ClammError::PoolNotFound { pool_id })?;
        pool.sqrt_price = sqrt_price;
        pool.current_tick = current_tick;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
