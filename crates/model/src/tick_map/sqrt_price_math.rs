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
    math::{Q96, div_rounding, mul_div, sqrt_mul_div},
};

use crate::tick_map::tick_math::get_sqrt_ratio_at_tick;

fn fit_u160(value: U256) -> Result<U160, ArithmeticError> {
    if value > U256::from(U160::MAX) {
        return Err(ArithmeticError::Overflow);
    }
    Ok(U160::from(value))
}

/// Encodes `sqrt(numerator / denominator)` as a Q64.96 fixed point number.
///
/// For a pool price (token1 per token0) pass the token1 amount as the numerator.
///
/// # Errors
///
/// Returns an error if:
/// - `denominator` is zero.
/// - The encoded price does not fit in 160 bits (`numerator / denominator >= 2^128`).
pub fn encode_sqrt_ratio_x96(numerator: U256, denominator: U256) -> Result<U160, ArithmeticError> {
    if numerator.is_zero() {
        return if denominator.is_zero() {
            Err(ArithmeticError::DivisionByZero)
        } else {
            Ok(U160::ZERO)
        };
    }
    // sqrt(n / d) * 2^96 = sqrt(n * 2^192 / d), the quotient needs up to 512 bits
    let q192: U256 = U256::from(1u8) << 192;
    fit_u160(sqrt_mul_div(numerator, q192, denominator)?)
}

/// Calculates the next sqrt price after adding `amount` of token0, rounding up.
fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U160,
    liquidity: u128,
    amount: U256,
) -> Result<U160, ArithmeticError> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    let numerator: U256 = U256::from(liquidity) << 96;
    let sqrt_price_x96 = U256::from(sqrt_price_x96);

    if let Some(product) = amount.checked_mul(sqrt_price_x96)
        && let Some(denominator) = numerator.checked_add(product)
    {
        return fit_u160(mul_div(numerator, sqrt_price_x96, denominator, Rounding::Up)?);
    }

    // numerator / (numerator / sqrt_price + amount)
    let denominator = (numerator / sqrt_price_x96)
        .checked_add(amount)
        .ok_or(ArithmeticError::Overflow)?;
    fit_u160(div_rounding(numerator, denominator, Rounding::Up)?)
}

/// Calculates the next sqrt price after adding `amount` of token1, rounding down.
fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_price_x96: U160,
    liquidity: u128,
    amount: U256,
) -> Result<U160, ArithmeticError> {
    let quotient = if amount <= U256::from(U160::MAX) {
        div_rounding(amount << 96, U256::from(liquidity), Rounding::Down)?
    } else {
        mul_div(amount, Q96, U256::from(liquidity), Rounding::Down)?
    };
    let next = U256::from(sqrt_price_x96)
        .checked_add(quotient)
        .ok_or(ArithmeticError::Overflow)?;
    fit_u160(next)
}

/// Calculates the next sqrt price given an input amount of token0 (`zero_for_one`) or token1.
///
/// The price always moves less than or equal to the exact amount implied by `amount_in`, so the
/// pool never gives away more output than the input pays for.
///
/// # Errors
///
/// Returns an error if the resulting price does not fit in 160 bits.
///
/// # Panics
///
/// Panics if `sqrt_price_x96` is zero or if `liquidity` is zero.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x96: U160,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U160, ArithmeticError> {
    assert!(
        sqrt_price_x96 > U160::ZERO,
        "sqrt_price_x96 must be greater than zero"
    );
    assert!(liquidity > 0, "Liquidity must be greater than zero");

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_in)
    }
}

fn sort(a: U160, b: U160) -> (U256, U256) {
    if a > b {
        (U256::from(b), U256::from(a))
    } else {
        (U256::from(a), U256::from(b))
    }
}

/// Calculates the amount of token0 between two sqrt prices for `liquidity`:
/// `liquidity * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)`.
///
/// # Errors
///
/// Returns an error if the lower sqrt price is zero or the amount overflows.
pub fn get_amount0_delta(
    sqrt_ratio_ax96: U160,
    sqrt_ratio_bx96: U160,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256, ArithmeticError> {
    let (sqrt_ratio_a, sqrt_ratio_b) = sort(sqrt_ratio_ax96, sqrt_ratio_bx96);
    if sqrt_ratio_a.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    let numerator1: U256 = U256::from(liquidity) << 96;
    let numerator2 = sqrt_ratio_b - sqrt_ratio_a;

    let scaled = mul_div(numerator1, numerator2, sqrt_ratio_b, rounding)?;
    div_rounding(scaled, sqrt_ratio_a, rounding)
}

/// Calculates the amount of token1 between two sqrt prices for `liquidity`:
/// `liquidity * (sqrt_b - sqrt_a)`.
///
/// # Errors
///
/// Returns an error if the amount overflows.
pub fn get_amount1_delta(
    sqrt_ratio_ax96: U160,
    sqrt_ratio_bx96: U160,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256, ArithmeticError> {
    let (sqrt_ratio_a, sqrt_ratio_b) = sort(sqrt_ratio_ax96, sqrt_ratio_bx96);
    mul_div(
        U256::from(liquidity),
        sqrt_ratio_b - sqrt_ratio_a,
        Q96,
        rounding,
    )
}

/// Calculates the token amounts backing `liquidity` over `[tick_lower, tick_upper]` at the
/// current sqrt price.
///
/// Deposits round [`Rounding::Up`] and withdrawals round [`Rounding::Down`].
///
/// # Errors
///
/// Returns an error if an amount overflows.
pub fn get_amounts_for_liquidity(
    sqrt_ratio_x96: U160,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    rounding: Rounding,
) -> Result<(U256, U256), ArithmeticError> {
    let sqrt_ratio_a = get_sqrt_ratio_at_tick(tick_lower.min(tick_upper));
    let sqrt_ratio_b = get_sqrt_ratio_at_tick(tick_lower.max(tick_upper));

    if sqrt_ratio_x96 <= sqrt_ratio_a {
        // Below the range, the position is entirely token0
        let amount0 = get_amount0_delta(sqrt_ratio_a, sqrt_ratio_b, liquidity, rounding)?;
        Ok((amount0, U256::ZERO))
    } else if sqrt_ratio_x96 < sqrt_ratio_b {
        let amount0 = get_amount0_delta(sqrt_ratio_x96, sqrt_ratio_b, liquidity, rounding)?;
        let amount1 = get_amount1_delta(sqrt_ratio_a, sqrt_ratio_x96, liquidity, rounding)?;
        Ok((amount0, amount1))
    } else {
        // Above the range, the position is entirely token1
        let amount1 = get_amount1_delta(sqrt_ratio_a, sqrt_ratio_b, liquidity, rounding)?;
        Ok((U256::ZERO, amount1))
    }
}

/// Expands an amount to 18 decimal places (multiplies by 10^18).
#[must_use]
pub fn expand_to_18_decimals(amount: u64) -> u128 {
    u128::from(amount) * 10u128.pow(18)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::*;

    use super::*;
    use crate::tick_map::tick_math::{MAX_SQRT_RATIO, MAX_TICK};

    fn encode(numerator: u128, denominator: u128) -> U160 {
        encode_sqrt_ratio_x96(U256::from(numerator), U256::from(denominator)).unwrap()
    }

    #[rstest]
    fn test_encode_sqrt_ratio_x96_some_values() {
        assert_eq!(encode(1, 1), U160::from(1u8) << 96);
        assert_eq!(
            encode(100, 1),
            U160::from(792281625142643375935439503360_u128)
        );
        assert_eq!(
            encode(1, 100),
            U160::from(7922816251426433759354395033_u128)
        );
        assert_eq!(
            encode(111, 333),
            U160::from(45742400955009932534161870629_u128)
        );
        assert_eq!(
            encode(333, 111),
            U160::from(137227202865029797602485611888_u128)
        );
    }

    #[rstest]
    fn test_encode_sqrt_ratio_x96_errors() {
        assert_eq!(
            encode_sqrt_ratio_x96(U256::from(1u8), U256::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            encode_sqrt_ratio_x96(U256::MAX, U256::from(1u8)),
            Err(ArithmeticError::Overflow)
        );
        assert_eq!(
            encode_sqrt_ratio_x96(U256::ZERO, U256::from(5u8)),
            Ok(U160::ZERO)
        );
    }

    #[rstest]
    #[should_panic(expected = "sqrt_price_x96 must be greater than zero")]
    fn test_get_next_sqrt_price_from_input_panics_if_price_zero() {
        let _ = get_next_sqrt_price_from_input(U160::ZERO, 1, U256::ZERO, true);
    }

    #[rstest]
    #[should_panic(expected = "Liquidity must be greater than zero")]
    fn test_get_next_sqrt_price_from_input_panics_if_liquidity_zero() {
        let _ = get_next_sqrt_price_from_input(U160::from(1u8), 0, U256::ZERO, true);
    }

    #[rstest]
    fn test_get_next_sqrt_price_from_input_errors_on_big_price() {
        let price = U160::MAX - U160::from(1u8);
        let result = get_next_sqrt_price_from_input(price, 1024, U256::from(1024u64), false);
        assert_eq!(result, Err(ArithmeticError::Overflow));
    }

    #[rstest]
    fn test_any_input_amount_cannot_underflow_the_price() {
        let amount_in = U256::from(2u8).pow(U256::from(255u16));
        let result = get_next_sqrt_price_from_input(U160::from(1u8), 1, amount_in, true).unwrap();
        assert_eq!(result, U160::from(1u8));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_returns_input_price_if_amount_in_is_zero(#[case] zero_for_one: bool) {
        let price = encode(1, 1);
        let liquidity = expand_to_18_decimals(1) / 10;
        let result =
            get_next_sqrt_price_from_input(price, liquidity, U256::ZERO, zero_for_one).unwrap();
        assert_eq!(result, price);
    }

    #[rstest]
    fn test_returns_the_minimum_price_for_max_inputs() {
        let sqrt_p = U160::MAX;
        let liquidity = u128::MAX;
        let max_amount_no_overflow =
            U256::MAX - (U256::from(liquidity) << 96) / U256::from(sqrt_p);
        let result =
            get_next_sqrt_price_from_input(sqrt_p, liquidity, max_amount_no_overflow, true)
                .unwrap();
        assert_eq!(result, U160::from(1u8));
    }

    #[rstest]
    fn test_input_amount_of_0_1_token1() {
        let sqrt_q = get_next_sqrt_price_from_input(
            encode(1, 1),
            expand_to_18_decimals(1),
            U256::from(expand_to_18_decimals(1)) / U256::from(10u8),
            false,
        )
        .unwrap();
        assert_eq!(
            sqrt_q,
            U160::from_str("87150978765690771352898345369").unwrap()
        );
    }

    #[rstest]
    fn test_input_amount_of_0_1_token0() {
        let sqrt_q = get_next_sqrt_price_from_input(
            encode(1, 1),
            expand_to_18_decimals(1),
            U256::from(expand_to_18_decimals(1)) / U256::from(10u8),
            true,
        )
        .unwrap();
        assert_eq!(
            sqrt_q,
            U160::from_str("72025602285694852357767227579").unwrap()
        );
    }

    #[rstest]
    fn test_amount_in_greater_than_uint96_max_and_zero_for_one() {
        let result = get_next_sqrt_price_from_input(
            encode(1, 1),
            expand_to_18_decimals(10),
            U256::from(2u8).pow(U256::from(100u8)),
            true,
        )
        .unwrap();
        assert_eq!(result, U160::from(624999999995069620u64));
    }

    #[rstest]
    fn test_can_return_1_with_enough_amount_in_and_zero_for_one() {
        let result =
            get_next_sqrt_price_from_input(encode(1, 1), 1, U256::MAX / U256::from(2u8), true)
                .unwrap();
        assert_eq!(result, U160::from(1u8));
    }

    #[rstest]
    #[case(0, 1, 1, 2, 1)]
    #[case(expand_to_18_decimals(1), 1, 1, 1, 1)]
    fn test_deltas_are_zero_for_empty_liquidity_or_equal_prices(
        #[case] liquidity: u128,
        #[case] a_num: u128,
        #[case] a_den: u128,
        #[case] b_num: u128,
        #[case] b_den: u128,
    ) {
        let a = encode(a_num, a_den);
        let b = encode(b_num, b_den);
        assert_eq!(
            get_amount0_delta(a, b, liquidity, Rounding::Up).unwrap(),
            U256::ZERO
        );
        assert_eq!(
            get_amount1_delta(a, b, liquidity, Rounding::Up).unwrap(),
            U256::ZERO
        );
    }

    #[rstest]
    fn test_get_amount0_delta_for_price_of_1_to_1_21() {
        let amount0 = get_amount0_delta(
            encode(1, 1),
            encode(121, 100),
            expand_to_18_decimals(1),
            Rounding::Up,
        )
        .unwrap();
        assert_eq!(amount0, U256::from(90909090909090910u64));

        let amount0_rounded_down = get_amount0_delta(
            encode(1, 1),
            encode(121, 100),
            expand_to_18_decimals(1),
            Rounding::Down,
        )
        .unwrap();
        assert_eq!(amount0_rounded_down, amount0 - U256::from(1u8));
    }

    #[rstest]
    fn test_encode_sqrt_ratio_x96_above_two_pow_64() {
        assert_eq!(encode(1 << 70, 1), U160::from(1u8) << 131);
        assert_eq!(encode(1 << 96, 1), U160::from(1u8) << 144);
    }

    #[rstest]
    fn test_encode_sqrt_ratio_x96_near_max_sqrt_ratio() {
        // sqrt(2^127) * 2^96 = 2^159.5, just under the maximum price
        let price = encode(1 << 127, 1);
        assert!(price < MAX_SQRT_RATIO);
        assert!(price > get_sqrt_ratio_at_tick(MAX_TICK - 50_000));
        assert_eq!(
            encode_sqrt_ratio_x96(U256::from(1u8) << 128, U256::from(1u8)),
            Err(ArithmeticError::Overflow)
        );
    }

    #[rstest]
    fn test_encode_sqrt_ratio_x96_zero_denominator() {
        assert_eq!(
            encode_sqrt_ratio_x96(U256::from(1u8), U256::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[rstest]
    fn test_get_amount0_delta_works_for_prices_that_overflow() {
        let price_low = encode(1 << 90, 1);
        let price_high = encode(1 << 96, 1);

        let up = get_amount0_delta(price_low, price_high, expand_to_18_decimals(1), Rounding::Up)
            .unwrap();
        let down =
            get_amount0_delta(price_low, price_high, expand_to_18_decimals(1), Rounding::Down)
                .unwrap();
        assert_eq!(up, down + U256::from(1u8));
    }

    #[rstest]
    fn test_get_amount1_delta_for_price_of_1_to_1_21() {
        let amount1 = get_amount1_delta(
            encode(1, 1),
            encode(121, 100),
            expand_to_18_decimals(1),
            Rounding::Up,
        )
        .unwrap();
        assert_eq!(amount1, U256::from(100000000000000000u64));

        let amount1_rounded_down = get_amount1_delta(
            encode(1, 1),
            encode(121, 100),
            expand_to_18_decimals(1),
            Rounding::Down,
        )
        .unwrap();
        assert_eq!(amount1_rounded_down, amount1 - U256::from(1u8));
    }

    #[rstest]
    fn test_get_amounts_for_liquidity_by_price_position() {
        let liquidity = expand_to_18_decimals(1);

        // Below the range: only token0
        let (amount0, amount1) = get_amounts_for_liquidity(
            get_sqrt_ratio_at_tick(-200),
            -100,
            100,
            liquidity,
            Rounding::Up,
        )
        .unwrap();
        assert!(amount0 > U256::ZERO);
        assert_eq!(amount1, U256::ZERO);

        // Inside the range: both tokens, symmetric around tick 0
        let (amount0, amount1) =
            get_amounts_for_liquidity(get_sqrt_ratio_at_tick(0), -100, 100, liquidity, Rounding::Up)
                .unwrap();
        assert!(amount0 > U256::ZERO);
        assert!(amount1 > U256::ZERO);

        // Above the range: only token1
        let (amount0, amount1) = get_amounts_for_liquidity(
            get_sqrt_ratio_at_tick(200),
            -100,
            100,
            liquidity,
            Rounding::Up,
        )
        .unwrap();
        assert_eq!(amount0, U256::ZERO);
        assert!(amount1 > U256::ZERO);
    }

    #[rstest]
    #[case(-100, 100)]
    #[case(-887220, 887220)]
    #[case(60, 120)]
    #[case(-120, -60)]
    fn test_get_amounts_for_liquidity_rounding_favours_pool(#[case] lower: i32, #[case] upper: i32) {
        let price = get_sqrt_ratio_at_tick(0);
        let liquidity = 123_456_789_012_345u128;
        let (up0, up1) =
            get_amounts_for_liquidity(price, lower, upper, liquidity, Rounding::Up).unwrap();
        let (down0, down1) =
            get_amounts_for_liquidity(price, lower, upper, liquidity, Rounding::Down).unwrap();
        assert!(down0 <= up0);
        assert!(down1 <= up1);
        assert!(up0 - down0 <= U256::from(1u8));
        assert!(up1 - down1 <= U256::from(1u8));
    }
}
