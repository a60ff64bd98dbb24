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

//! Rounding-aware fixed-point arithmetic.
//!
//! Every multiply-then-divide in the accounting core goes through [`mul_div`] with an explicit
//! [`Rounding`] direction. Amounts the protocol is owed (deposits, fees charged) round
//! [`Rounding::Up`]; amounts the protocol pays out (withdrawals, claims, growth credited to
//! liquidity providers) round [`Rounding::Down`]. Division by zero and results that do not fit
//! in 256 bits fail with an [`ArithmeticError`] instead of wrapping or saturating.

use alloy_primitives::{I256, U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The Q64.96 scaling factor (2^96) used for sqrt prices.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// The Q128.128 scaling factor (2^128) used for growth per unit of liquidity.
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

/// The direction in which an inexact quotient is rounded.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Rounding {
    /// Truncate toward zero. Used for anything paid out by the pool.
    Down,
    /// Round away from zero. Used for anything owed to the pool.
    Up,
    /// Round to the nearest integer, with halves rounded away from zero.
    Nearest,
}

/// An arithmetic failure in the fixed-point layer.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithmeticError {
    /// The result does not fit in the target representation.
    #[error("Arithmetic overflow")]
    Overflow,
    /// The divisor was zero.
    #[error("Division by zero")]
    DivisionByZero,
    /// A value required to be non-negative was negative.
    #[error("Negative value where non-negative is required")]
    NegativeValue,
}

fn round_quotient(quotient: U512, remainder: U512, denominator: U512, rounding: Rounding) -> U512 {
    if remainder.is_zero() {
        return quotient;
    }
    match rounding {
        Rounding::Down => quotient,
        Rounding::Up => quotient + U512::from(1u8),
        Rounding::Nearest => {
            if remainder << 1 >= denominator {
                quotient + U512::from(1u8)
            } else {
                quotient
            }
        }
    }
}

fn narrow(value: U512) -> Result<U256, ArithmeticError> {
    if value > U512::from(U256::MAX) {
        return Err(ArithmeticError::Overflow);
    }
    Ok(value.to::<U256>())
}

/// Calculates `a * b / denominator` with full 512-bit precision, rounding the quotient in the
/// given direction.
///
/// # Errors
///
/// Returns an error if:
/// - `denominator` is zero.
/// - The rounded result does not fit in 256 bits.
pub fn mul_div(
    a: U256,
    b: U256,
    denominator: U256,
    rounding: Rounding,
) -> Result<U256, ArithmeticError> {
    if denominator.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let quotient = product / denominator;
    let remainder = product % denominator;
    narrow(round_quotient(quotient, remainder, denominator, rounding))
}

/// Calculates `a / denominator`, rounding the quotient in the given direction.
///
/// # Errors
///
/// Returns an error if `denominator` is zero.
pub fn div_rounding(a: U256, denominator: U256, rounding: Rounding) -> Result<U256, ArithmeticError> {
    mul_div(a, U256::from(1u8), denominator, rounding)
}

/// Adds two amounts, failing instead of wrapping.
///
/// # Errors
///
/// Returns an error if the sum overflows 256 bits.
pub fn checked_add(a: U256, b: U256) -> Result<U256, ArithmeticError> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

/// Subtracts `b` from `a`, failing instead of wrapping.
///
/// # Errors
///
/// Returns an error if `b > a`.
pub fn checked_sub(a: U256, b: U256) -> Result<U256, ArithmeticError> {
    a.checked_sub(b).ok_or(ArithmeticError::NegativeValue)
}

/// Splits a non-negative decimal into an exact `(numerator, denominator)` integer ratio.
///
/// # Errors
///
/// Returns an error if `rate` is negative.
pub fn decimal_ratio(rate: Decimal) -> Result<(U256, U256), ArithmeticError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(ArithmeticError::NegativeValue);
    }
    let numerator = U256::from(rate.mantissa().unsigned_abs());
    let denominator = U256::from(10u8).pow(U256::from(rate.scale()));
    Ok((numerator, denominator))
}

/// Multiplies an integer amount by a decimal rate exactly, rounding in the given direction.
///
/// # Errors
///
/// Returns an error if:
/// - `rate` is negative.
/// - The result does not fit in 256 bits.
pub fn mul_decimal(amount: U256, rate: Decimal, rounding: Rounding) -> Result<U256, ArithmeticError> {
    let (numerator, denominator) = decimal_ratio(rate)?;
    mul_div(amount, numerator, denominator, rounding)
}

/// Multiplies an integer amount by `1 - rate` exactly, rounding in the given direction.
///
/// # Errors
///
/// Returns an error if:
/// - `rate` is negative.
/// - `rate` is greater than one.
pub fn mul_complement_decimal(
    amount: U256,
    rate: Decimal,
    rounding: Rounding,
) -> Result<U256, ArithmeticError> {
    let (numerator, denominator) = decimal_ratio(rate)?;
    let complement = checked_sub(denominator, numerator)?;
    mul_div(amount, complement, denominator, rounding)
}

/// Returns the integer square root of `value`, rounded down.
#[must_use]
pub fn sqrt(value: U256) -> U256 {
    if value < U256::from(2u8) {
        return value;
    }
    let mut z = value;
    let mut y = (value >> 1) + U256::from(1u8);
    while y < z {
        z = y;
        y = (value / y + y) >> 1;
    }
    z
}

/// Calculates `floor(sqrt(a * b / denominator))` with the quotient held in 512 bits.
///
/// The root of any 512-bit quotient fits in 256 bits, so only a zero `denominator` fails.
///
/// # Errors
///
/// Returns an error if `denominator` is zero.
pub fn sqrt_mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, ArithmeticError> {
    if denominator.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    let value = U512::from(a) * U512::from(b) / U512::from(denominator);
    if value < U512::from(2u8) {
        return narrow(value);
    }
    let mut z = value;
    let mut y: U512 = (value >> 1usize) + U512::from(1u8);
    while y < z {
        z = y;
        y = (value / y + y) >> 1usize;
    }
    narrow(z)
}

/// Converts an unsigned amount into a signed 256-bit value.
///
/// # Errors
///
/// Returns an error if `value` exceeds [`I256::MAX`].
pub fn to_signed(value: U256) -> Result<I256, ArithmeticError> {
    I256::try_from(value).map_err(|_| ArithmeticError::Overflow)
}

/// Converts a signed 256-bit value into an unsigned amount.
///
/// # Errors
///
/// Returns an error if `value` is negative.
pub fn to_unsigned(value: I256) -> Result<U256, ArithmeticError> {
    if value.is_negative() {
        return Err(ArithmeticError::NegativeValue);
    }
    Ok(value.into_raw())
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_scaling_constants() {
        assert_eq!(Q96, U256::from(1u8) << 96);
        assert_eq!(Q128, U256::from(1u8) << 128);
    }

    #[rstest]
    #[case(10, 10, 3, Rounding::Down, 33)]
    #[case(10, 10, 3, Rounding::Up, 34)]
    #[case(10, 10, 3, Rounding::Nearest, 33)]
    #[case(10, 10, 6, Rounding::Down, 16)]
    #[case(10, 10, 6, Rounding::Up, 17)]
    #[case(10, 10, 6, Rounding::Nearest, 17)]
    #[case(5, 1, 2, Rounding::Down, 2)]
    #[case(5, 1, 2, Rounding::Up, 3)]
    #[case(5, 1, 2, Rounding::Nearest, 3)]
    #[case(6, 4, 3, Rounding::Down, 8)]
    #[case(6, 4, 3, Rounding::Up, 8)]
    #[case(6, 4, 3, Rounding::Nearest, 8)]
    #[case(0, 4, 3, Rounding::Up, 0)]
    fn test_mul_div_rounding(
        #[case] a: u64,
        #[case] b: u64,
        #[case] denominator: u64,
        #[case] rounding: Rounding,
        #[case] expected: u64,
    ) {
        let result = mul_div(
            U256::from(a),
            U256::from(b),
            U256::from(denominator),
            rounding,
        )
        .unwrap();
        assert_eq!(result, U256::from(expected));
    }

    #[rstest]
    fn test_mul_div_uses_wide_intermediate() {
        let result = mul_div(U256::MAX, U256::MAX, U256::MAX, Rounding::Down).unwrap();
        assert_eq!(result, U256::MAX);

        let result = mul_div(Q128, Q128, Q128 << 64, Rounding::Down).unwrap();
        assert_eq!(result, U256::from(1u8) << 192);
    }

    #[rstest]
    fn test_mul_div_division_by_zero() {
        let result = mul_div(U256::from(1u8), U256::from(1u8), U256::ZERO, Rounding::Down);
        assert_eq!(result, Err(ArithmeticError::DivisionByZero));
    }

    #[rstest]
    fn test_mul_div_overflow() {
        let result = mul_div(U256::MAX, U256::from(2u8), U256::from(1u8), Rounding::Down);
        assert_eq!(result, Err(ArithmeticError::Overflow));
    }

    #[rstest]
    fn test_mul_div_at_and_above_boundary() {
        let result = mul_div(U256::MAX, U256::from(3u8), U256::from(3u8), Rounding::Up).unwrap();
        assert_eq!(result, U256::MAX);
        let result = mul_div(U256::MAX, U256::MAX, U256::MAX - U256::from(1u8), Rounding::Up);
        assert_eq!(result, Err(ArithmeticError::Overflow));
    }

    #[rstest]
    fn test_div_rounding() {
        assert_eq!(
            div_rounding(U256::from(7u8), U256::from(2u8), Rounding::Up).unwrap(),
            U256::from(4u8)
        );
        assert_eq!(
            div_rounding(U256::from(7u8), U256::from(2u8), Rounding::Down).unwrap(),
            U256::from(3u8)
        );
        assert_eq!(
            div_rounding(U256::from(7u8), U256::ZERO, Rounding::Down),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[rstest]
    fn test_checked_add_and_sub() {
        assert_eq!(
            checked_add(U256::from(1u8), U256::from(2u8)).unwrap(),
            U256::from(3u8)
        );
        assert_eq!(
            checked_add(U256::MAX, U256::from(1u8)),
            Err(ArithmeticError::Overflow)
        );
        assert_eq!(
            checked_sub(U256::from(1u8), U256::from(2u8)),
            Err(ArithmeticError::NegativeValue)
        );
    }

    #[rstest]
    #[case(dec!(0.003), 3, 1000)]
    #[case(dec!(0), 0, 1)]
    #[case(dec!(1), 1, 1)]
    #[case(dec!(0.0500), 500, 10000)]
    fn test_decimal_ratio(#[case] rate: Decimal, #[case] numerator: u64, #[case] denominator: u64) {
        let (n, d) = decimal_ratio(rate).unwrap();
        assert_eq!(n, U256::from(numerator));
        assert_eq!(d, U256::from(denominator));
    }

    #[rstest]
    fn test_decimal_ratio_negative() {
        assert_eq!(
            decimal_ratio(dec!(-0.01)),
            Err(ArithmeticError::NegativeValue)
        );
    }

    #[rstest]
    #[case(1000, dec!(0.003), Rounding::Up, 3)]
    #[case(1001, dec!(0.003), Rounding::Up, 4)]
    #[case(1001, dec!(0.003), Rounding::Down, 3)]
    #[case(1, dec!(0.0001), Rounding::Up, 1)]
    #[case(1, dec!(0.0001), Rounding::Down, 0)]
    #[case(500, dec!(0), Rounding::Up, 0)]
    fn test_mul_decimal(
        #[case] amount: u64,
        #[case] rate: Decimal,
        #[case] rounding: Rounding,
        #[case] expected: u64,
    ) {
        let result = mul_decimal(U256::from(amount), rate, rounding).unwrap();
        assert_eq!(result, U256::from(expected));
    }

    #[rstest]
    fn test_mul_complement_decimal() {
        let result = mul_complement_decimal(U256::from(1001u64), dec!(0.003), Rounding::Down).unwrap();
        // 1001 * 0.997 = 997.997
        assert_eq!(result, U256::from(997u64));
        assert_eq!(
            mul_complement_decimal(U256::from(1u8), dec!(1.5), Rounding::Down),
            Err(ArithmeticError::NegativeValue)
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(15, 3)]
    #[case(16, 4)]
    #[case(17, 4)]
    #[case(1_000_000, 1_000)]
    fn test_sqrt(#[case] value: u64, #[case] expected: u64) {
        assert_eq!(sqrt(U256::from(value)), U256::from(expected));
    }

    #[rstest]
    fn test_sqrt_max() {
        let expected = (U256::from(1u8) << 128) - U256::from(1u8);
        assert_eq!(sqrt(U256::MAX), expected);
    }

    #[rstest]
    fn test_sqrt_mul_div_beyond_256_bit_quotient() {
        // sqrt(2^70 * 2^192 / 1) = 2^131
        let result = sqrt_mul_div(U256::from(1u8) << 70, U256::from(1u8) << 192, U256::from(1u8));
        assert_eq!(result.unwrap(), U256::from(1u8) << 131);
        let max = sqrt_mul_div(U256::MAX, U256::MAX, U256::from(1u8)).unwrap();
        assert_eq!(max, U256::MAX);
    }

    #[rstest]
    #[case(15, 1, 3)]
    #[case(16, 1, 4)]
    #[case(1, 4, 0)]
    #[case(0, 9, 0)]
    fn test_sqrt_mul_div_floors(#[case] a: u64, #[case] d: u64, #[case] expected: u64) {
        let result = sqrt_mul_div(U256::from(a), U256::from(1u8), U256::from(d)).unwrap();
        assert_eq!(result, U256::from(expected));
    }

    #[rstest]
    fn test_sqrt_mul_div_zero_denominator() {
        assert_eq!(
            sqrt_mul_div(U256::from(1u8), U256::from(1u8), U256::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[rstest]
    fn test_signed_conversions() {
        let five = I256::from_raw(U256::from(5u8));
        assert_eq!(to_signed(U256::from(5u8)).unwrap(), five);
        assert_eq!(to_signed(U256::MAX), Err(ArithmeticError::Overflow));
        assert_eq!(to_unsigned(five).unwrap(), U256::from(5u8));
        assert_eq!(to_unsigned(-five), Err(ArithmeticError::NegativeValue));
    }

    #[rstest]
    fn test_rounding_display() {
        assert_eq!(Rounding::Up.to_string(), "UP");
        assert_eq!("nearest".parse::<Rounding>().unwrap(), Rounding::Nearest);
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Property-based testing
    ////////////////////////////////////////////////////////////////////////////////

    use proptest::prelude::*;

    proptest! {
        #[rstest]
        fn prop_round_up_is_at_most_one_above_round_down(
            a in any::<u128>(),
            b in any::<u128>(),
            d in 1u128..,
        ) {
            let (a, b, d) = (U256::from(a), U256::from(b), U256::from(d));
            let down = mul_div(a, b, d, Rounding::Down).unwrap();
            let up = mul_div(a, b, d, Rounding::Up).unwrap();
            let nearest = mul_div(a, b, d, Rounding::Nearest).unwrap();
            prop_assert!(up == down || up == down + U256::from(1u8));
            prop_assert!(nearest == down || nearest == up);
        }

        #[rstest]
        fn prop_sqrt_is_floor(value in any::<u128>()) {
            let value = U256::from(value);
            let root = sqrt(value);
            prop_assert!(root * root <= value);
            let next = root + U256::from(1u8);
            prop_assert!(next * next > value);
        }
    }
}
