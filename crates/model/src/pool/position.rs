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

use alloy_primitives::U256;
use clamm_core::{ArithmeticError, math::checked_add};
use serde::{Deserialize, Serialize};

use crate::{identifiers::PositionKey, tick_map::liquidity_math::liquidity_math_add};

/// A liquidity position: one owner's liquidity over one tick range of one pool.
///
/// Earned fees and incentives are not stored here, they live in the pool's accumulators under
/// the same [`PositionKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// The position key.
    pub key: PositionKey,
    /// The amount of liquidity in the position.
    pub liquidity: u128,
    /// Total amount of token0 deposited into this position.
    pub total_amount0_deposited: U256,
    /// Total amount of token1 deposited into this position.
    pub total_amount1_deposited: U256,
    /// Total amount of token0 withdrawn as principal from this position.
    pub total_amount0_withdrawn: U256,
    /// Total amount of token1 withdrawn as principal from this position.
    pub total_amount1_withdrawn: U256,
}

impl Position {
    /// Creates an empty [`Position`] for `key`.
    #[must_use]
    pub fn new(key: PositionKey) -> Self {
        Self {
            key,
            liquidity: 0,
            total_amount0_deposited: U256::ZERO,
            total_amount1_deposited: U256::ZERO,
            total_amount0_withdrawn: U256::ZERO,
            total_amount1_withdrawn: U256::ZERO,
        }
    }

    /// Updates the liquidity amount by the given delta.
    ///
    /// # Panics
    ///
    /// Panics if the liquidity overflows or goes negative.
    pub fn update_liquidity(&mut self, liquidity_delta: i128) {
        self.liquidity = liquidity_math_add(self.liquidity, liquidity_delta);
    }

    /// Records the principal moved by a deposit (positive delta) or a withdrawal.
    ///
    /// # Errors
    ///
    /// Returns an error if a running total overflows, in which case nothing is recorded.
    pub fn update_amounts(
        &mut self,
        liquidity_delta: i128,
        amount0: U256,
        amount1: U256,
    ) -> Result<(), ArithmeticError> {
        let (total0, total1) = if liquidity_delta > 0 {
            (&mut self.total_amount0_deposited, &mut self.total_amount1_deposited)
        } else {
            (&mut self.total_amount0_withdrawn, &mut self.total_amount1_withdrawn)
        };
        let next0 = checked_add(*total0, amount0)?;
        let next1 = checked_add(*total1, amount1)?;
        *total0 = next0;
        *total1 = next1;
        Ok(())
    }

    /// Checks if the position holds no liquidity.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.liquidity == 0
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
