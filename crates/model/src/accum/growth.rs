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

//! Growth values tracked by the accumulators, and the pure functions relating a tick's
//! growth-outside to the global growth.
//!
//! A tick's growth-outside is the growth accrued on the side of the tick away from the current
//! price. Seeding, crossing and the below/above/inside computations are expressed here over any
//! [`GrowthValue`] so the fee stream and every incentive stream share the exact same arithmetic.

use std::fmt::Debug;

use alloy_primitives::{I256, U256};
use clamm_core::{
    ArithmeticError, Rounding,
    math::{Q128, checked_add, mul_div, to_unsigned},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identifiers::IncentiveId;

/// A cumulative per-unit-of-liquidity growth value (signed Q128).
pub trait GrowthValue: Clone + Debug + Default + PartialEq {
    /// The amount owed to a position once growth is multiplied by its liquidity.
    type Owed: Clone + Debug + Default + PartialEq;

    /// Adds `other`, failing on overflow.
    ///
    /// # Errors
    ///
    /// Returns an error if the sum overflows.
    fn checked_add(&self, other: &Self) -> Result<Self, ArithmeticError>;

    /// Subtracts `other`, failing on overflow.
    ///
    /// # Errors
    ///
    /// Returns an error if the difference overflows.
    fn checked_sub(&self, other: &Self) -> Result<Self, ArithmeticError>;

    /// Returns true if any component is negative.
    fn is_negative(&self) -> bool;

    /// Converts a non-negative growth delta into the amount owed to `liquidity`, rounding down.
    ///
    /// # Errors
    ///
    /// Returns an error if the growth is negative or the amount overflows.
    fn owed_for(&self, liquidity: u128) -> Result<Self::Owed, ArithmeticError>;

    /// Sums two owed amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the sum overflows.
    fn add_owed(a: &Self::Owed, b: &Self::Owed) -> Result<Self::Owed, ArithmeticError>;
}

fn owed_for_signed(growth: I256, liquidity: u128) -> Result<U256, ArithmeticError> {
    mul_div(to_unsigned(growth)?, U256::from(liquidity), Q128, Rounding::Down)
}

impl GrowthValue for I256 {
    type Owed = U256;

    fn checked_add(&self, other: &Self) -> Result<Self, ArithmeticError> {
        I256::checked_add(*self, *other).ok_or(ArithmeticError::Overflow)
    }

    fn checked_sub(&self, other: &Self) -> Result<Self, ArithmeticError> {
        I256::checked_sub(*self, *other).ok_or(ArithmeticError::Overflow)
    }

    fn is_negative(&self) -> bool {
        I256::is_negative(self)
    }

    fn owed_for(&self, liquidity: u128) -> Result<Self::Owed, ArithmeticError> {
        owed_for_signed(*self, liquidity)
    }

    fn add_owed(a: &Self::Owed, b: &Self::Owed) -> Result<Self::Owed, ArithmeticError> {
        checked_add(*a, *b)
    }
}

/// Fee growth of a pool, one component per token.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenGrowth {
    /// Growth denominated in token0.
    pub token0: I256,
    /// Growth denominated in token1.
    pub token1: I256,
}

impl TokenGrowth {
    /// Creates a new [`TokenGrowth`] instance.
    #[must_use]
    pub const fn new(token0: I256, token1: I256) -> Self {
        Self { token0, token1 }
    }

    /// Creates growth on a single token.
    #[must_use]
    pub fn single(growth: I256, is_token_zero: bool) -> Self {
        if is_token_zero {
            Self::new(growth, I256::ZERO)
        } else {
            Self::new(I256::ZERO, growth)
        }
    }
}

/// A pair of token amounts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAmounts {
    /// Amount of token0.
    pub amount0: U256,
    /// Amount of token1.
    pub amount1: U256,
}

impl TokenAmounts {
    /// Creates a new [`TokenAmounts`] instance.
    #[must_use]
    pub const fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    /// Returns true if both amounts are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }

    /// Adds two pairs component-wise.
    ///
    /// # Errors
    ///
    /// Returns an error if either sum overflows.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            checked_add(self.amount0, other.amount0)?,
            checked_add(self.amount1, other.amount1)?,
        ))
    }
}

impl GrowthValue for TokenGrowth {
    type Owed = TokenAmounts;

    fn checked_add(&self, other: &Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            GrowthValue::checked_add(&self.token0, &other.token0)?,
            GrowthValue::checked_add(&self.token1, &other.token1)?,
        ))
    }

    fn checked_sub(&self, other: &Self) -> Result<Self, ArithmeticError> {
        Ok(Self::new(
            GrowthValue::checked_sub(&self.token0, &other.token0)?,
            GrowthValue::checked_sub(&self.token1, &other.token1)?,
        ))
    }

    fn is_negative(&self) -> bool {
        self.token0.is_negative() || self.token1.is_negative()
    }

    fn owed_for(&self, liquidity: u128) -> Result<Self::Owed, ArithmeticError> {
        Ok(TokenAmounts::new(
            owed_for_signed(self.token0, liquidity)?,
            owed_for_signed(self.token1, liquidity)?,
        ))
    }

    fn add_owed(a: &Self::Owed, b: &Self::Owed) -> Result<Self::Owed, ArithmeticError> {
        a.checked_add(b)
    }
}

/// The global growth of every stream of a pool at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrowthSnapshot {
    /// Global fee growth.
    pub fee: TokenGrowth,
    /// Global growth of each incentive stream.
    pub incentives: IndexMap<IncentiveId, I256>,
}

/// Returns the growth-outside a freshly initialized tick starts with.
///
/// All growth before initialization is assumed to have happened below the tick, so a tick at or
/// below the current tick starts with the global growth and a tick above starts at zero.
#[must_use]
pub fn seed_growth_outside<G: GrowthValue>(tick: i32, current_tick: i32, global: &G) -> G {
    if current_tick >= tick {
        global.clone()
    } else {
        G::default()
    }
}

/// Returns a tick's growth-outside after the price crosses it.
///
/// # Errors
///
/// Returns an error if the subtraction overflows.
pub fn cross_growth_outside<G: GrowthValue>(global: &G, outside: &G) -> Result<G, ArithmeticError> {
    global.checked_sub(outside)
}

/// Returns the growth accrued below `lower_tick`.
///
/// # Errors
///
/// Returns an error if the subtraction overflows.
pub fn growth_below<G: GrowthValue>(
    lower_tick: i32,
    current_tick: i32,
    global: &G,
    lower_outside: &G,
) -> Result<G, ArithmeticError> {
    if current_tick >= lower_tick {
        Ok(lower_outside.clone())
    } else {
        global.checked_sub(lower_outside)
    }
}

/// Returns the growth accrued above `upper_tick`.
///
/// # Errors
///
/// Returns an error if the subtraction overflows.
pub fn growth_above<G: GrowthValue>(
    upper_tick: i32,
    current_tick: i32,
    global: &G,
    upper_outside: &G,
) -> Result<G, ArithmeticError> {
    if current_tick < upper_tick {
        Ok(upper_outside.clone())
    } else {
        global.checked_sub(upper_outside)
    }
}

/// Returns the growth accrued inside `[lower_tick, upper_tick)`: `global - below - above`.
///
/// The result may be negative when the range's ticks were seeded at different times, only
/// differences between two readings of the same range are meaningful.
///
/// # Errors
///
/// Returns an error if the subtraction overflows.
pub fn growth_inside<G: GrowthValue>(
    lower_tick: i32,
    upper_tick: i32,
    current_tick: i32,
    global: &G,
    lower_outside: &G,
    upper_outside: &G,
) -> Result<G, ArithmeticError> {
    let below = growth_below(lower_tick, current_tick, global, lower_outside)?;
    let above = growth_above(upper_tick, current_tick, global, upper_outside)?;
    global.checked_sub(&below)?.checked_sub(&above)
}

/// Converts `amount` spread over `liquidity` into per-unit Q128 growth, rounding down.
///
/// # Errors
///
/// Returns an error if:
/// - `liquidity` is zero.
/// - The growth exceeds [`I256::MAX`].
pub fn growth_per_liquidity(amount: U256, liquidity: u128) -> Result<I256, ArithmeticError> {
    let growth = mul_div(amount, Q128, U256::from(liquidity), Rounding::Down)?;
    clamm_core::math::to_signed(growth)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
