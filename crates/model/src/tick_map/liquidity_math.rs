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

use alloy_primitives::{U160, U256};
use clamm_core::{
    ArithmeticError, Rounding,
    math::{Q96, mul_div},
};

use crate::tick_map::tick_math::{MAX_TICK, MIN_TICK};

/// Add a signed liquidity delta to liquidity and panic if it overflows or underflows.
///
/// # Panics
///
/// This function panics if:
/// - Adding positive delta causes overflow.
/// - Subtracting causes underflow.
#[must_use]
pub fn liquidity_math_add(x: u128, y: i128) -> u128 {
    let delta = y.unsigned_abs();
    if y < 0 {
        match x.checked_sub(delta) {
            Some(z) => z,
            None => panic!("Liquidity subtraction underflow: x={x}, y={y}"),
        }
    } else {
        match x.checked_add(delta) {
            Some(z) => z,
            None => panic!("Liquidity addition overflow: x={x}, y={y}"),
        }
    }
}

/// Derives the maximum gross liquidity a single tick may reference for a given tick spacing.
///
/// Bounding every tick this way guarantees the active liquidity of the pool can never overflow a
/// `u128`, whatever combination of ranges is crossed.
#[must_use]
pub fn tick_spacing_to_max_liquidity_per_tick(tick_spacing: u32) -> u128 {
    let spacing = i64::from(tick_spacing.max(1));
    let min_tick = (i64::from(MIN_TICK) / spacing) * spacing;
    let max_tick = (i64::from(MAX_TICK) / spacing) * spacing;
    let num_ticks = ((max_tick - min_tick) / spacing) + 1;

    u128::MAX / num_ticks as u128
}

fn narrow_liquidity(value: U256) -> Result<u128, ArithmeticError> {
    u128::try_from(value).map_err(|_| ArithmeticError::Overflow)
}

fn sort(a: U160, b: U160) -> (U256, U256) {
    if a > b {
        (U256::from(b), U256::from(a))
    } else {
        (U256::from(a), U256::from(b))
    }
}

/// Computes the liquidity received for `amount0` of token0 over a sqrt price range, rounding down.
///
/// # Errors
///
/// Returns an error if the range is empty or the liquidity exceeds `u128`.
pub fn get_liquidity_for_amount0(
    sqrt_ratio_ax96: U160,
    sqrt_ratio_bx96: U160,
    amount0: U256,
) -> Result<u128, ArithmeticError> {
    let (sqrt_ratio_a, sqrt_ratio_b) = sort(sqrt_ratio_ax96, sqrt_ratio_bx96);
    let intermediate = mul_div(sqrt_ratio_a, sqrt_ratio_b, Q96, Rounding::Down)?;
    let liquidity = mul_div(
        amount0,
        intermediate,
        sqrt_ratio_b - sqrt_ratio_a,
        Rounding::Down,
    )?;
    narrow_liquidity(liquidity)
}

/// Computes the liquidity received for `amount1` of token1 over a sqrt price range, rounding down.
///
/// # Errors
///
/// Returns an error if the range is empty or the liquidity exceeds `u128`.
pub fn get_liquidity_for_amount1(
    sqrt_ratio_ax96: U160,
    sqrt_ratio_bx96: U160,
    amount1: U256,
) -> Result<u128, ArithmeticError> {
    let (sqrt_ratio_a, sqrt_ratio_b) = sort(sqrt_ratio_ax96, sqrt_ratio_bx96);
    let liquidity = mul_div(amount1, Q96, sqrt_ratio_b - sqrt_ratio_a, Rounding::Down)?;
    narrow_liquidity(liquidity)
}

/// Computes the maximum liquidity that `amount0` and `amount1` can back over `[sqrt_a, sqrt_b]`
/// at the current sqrt price, rounding down.
///
/// # Errors
///
/// Returns an error if the range is empty or the liquidity exceeds `u128`.
pub fn get_liquidity_for_amounts(
    sqrt_ratio_x96: U160,
    sqrt_ratio_ax96: U160,
    sqrt_ratio_bx96: U160,
    amount0: U256,
    amount1: U256,
) -> Result<u128, ArithmeticError> {
    let (sqrt_ratio_a, sqrt_ratio_b) = if sqrt_ratio_ax96 > sqrt_ratio_bx96 {
        (sqrt_ratio_bx96, sqrt_ratio_ax96)
    } else {
        (sqrt_ratio_ax96, sqrt_ratio_bx96)
    };

    if sqrt_ratio_x96 <= sqrt_ratio_a {
        get_liquidity_for_amount0(sqrt_ratio_a, sqrt_ratio_b, amount0)
    } else if sqrt_ratio_x96 < sqrt_ratio_b {
        let liquidity0 = get_liquidity_for_amount0(sqrt_ratio_x96, sqrt_ratio_b, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(sqrt_ratio_a, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(sqrt_ratio_a, sqrt_ratio_b, amount1)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
