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
use clamm_core::{ArithmeticError, Rounding, math::mul_complement_decimal};
use rust_decimal::Decimal;

use crate::{
    swap::fees::fee_for_step,
    tick_map::sqrt_price_math::{
        get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    },
};

/// The outcome of one exact-input swap step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStepResult {
    /// The sqrt price the step ended at.
    pub sqrt_ratio_next_x96: U160,
    /// Input consumed as principal, excluding the fee.
    pub amount_in: U256,
    /// Output paid by the pool.
    pub amount_out: U256,
    /// Fee charged on top of `amount_in`.
    pub fee_amount: U256,
}

/// Computes one exact-input swap step from `sqrt_ratio_current_x96` towards the nearer of
/// `next_tick_sqrt_price` and `sqrt_price_limit`.
///
/// Input amounts round up and the output amount rounds down.
///
/// # Errors
///
/// Returns an error if an amount or price computation overflows.
#[allow(clippy::too_many_arguments)]
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U160,
    next_tick_sqrt_price: U160,
    sqrt_price_limit: U160,
    zero_for_one: bool,
    liquidity: u128,
    amount_remaining: U256,
    fee_rate: Decimal,
) -> Result<SwapStepResult, ArithmeticError> {
    let sqrt_ratio_target_x96 = if zero_for_one {
        next_tick_sqrt_price.max(sqrt_price_limit)
    } else {
        next_tick_sqrt_price.min(sqrt_price_limit)
    };

    let amount_remaining_less_fee =
        mul_complement_decimal(amount_remaining, fee_rate, Rounding::Down)?;
    let amount_in_to_target = if zero_for_one {
        get_amount0_delta(
            sqrt_ratio_target_x96,
            sqrt_ratio_current_x96,
            liquidity,
            Rounding::Up,
        )?
    } else {
        get_amount1_delta(
            sqrt_ratio_current_x96,
            sqrt_ratio_target_x96,
            liquidity,
            Rounding::Up,
        )?
    };

    let sqrt_ratio_next_x96 = if amount_remaining_less_fee >= amount_in_to_target {
        sqrt_ratio_target_x96
    } else {
        get_next_sqrt_price_from_input(
            sqrt_ratio_current_x96,
            liquidity,
            amount_remaining_less_fee,
            zero_for_one,
        )?
    };
    let reached_target = sqrt_ratio_next_x96 == sqrt_ratio_target_x96;

    let (amount_in, amount_out) = if zero_for_one {
        let amount_in = if reached_target {
            amount_in_to_target
        } else {
            get_amount0_delta(
                sqrt_ratio_next_x96,
                sqrt_ratio_current_x96,
                liquidity,
                Rounding::Up,
            )?
        };
        let amount_out = get_amount1_delta(
            sqrt_ratio_next_x96,
            sqrt_ratio_current_x96,
            liquidity,
            Rounding::Down,
        )?;
        (amount_in, amount_out)
    } else {
        let amount_in = if reached_target {
            amount_in_to_target
        } else {
            get_amount1_delta(
                sqrt_ratio_current_x96,
                sqrt_ratio_next_x96,
                liquidity,
                Rounding::Up,
            )?
        };
        let amount_out = get_amount0_delta(
            sqrt_ratio_current_x96,
            sqrt_ratio_next_x96,
            liquidity,
            Rounding::Down,
        )?;
        (amount_in, amount_out)
    };

    let fee_amount = fee_for_step(
        sqrt_ratio_next_x96,
        next_tick_sqrt_price,
        sqrt_price_limit,
        amount_in,
        amount_remaining,
        fee_rate,
    )?;

    Ok(SwapStepResult {
        sqrt_ratio_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tick_map::{
        sqrt_price_math::{encode_sqrt_ratio_x96, expand_to_18_decimals},
        tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO},
    };

    fn encode(numerator: u128, denominator: u128) -> U160 {
        encode_sqrt_ratio_x96(U256::from(numerator), U256::from(denominator)).unwrap()
    }

    #[rstest]
    fn test_exact_amount_in_capped_at_next_tick_one_for_zero() {
        let price = encode(1, 1);
        let next_tick = encode(101, 100);
        let result = compute_swap_step(
            price,
            next_tick,
            MAX_SQRT_RATIO - U160::from(1u8),
            false,
            expand_to_18_decimals(2),
            U256::from(expand_to_18_decimals(1)),
            dec!(0.0006),
        )
        .unwrap();

        assert_eq!(result.sqrt_ratio_next_x96, next_tick);
        assert_eq!(result.amount_in, U256::from(9975124224178055u64));
        assert_eq!(result.amount_out, U256::from(9925619580021728u64));
        assert_eq!(result.fee_amount, U256::from(5985074534507u64));
    }

    #[rstest]
    fn test_exact_amount_in_capped_at_next_tick_zero_for_one() {
        let price = encode(1, 1);
        let next_tick = encode(100, 101);
        let result = compute_swap_step(
            price,
            next_tick,
            MIN_SQRT_RATIO + U160::from(1u8),
            true,
            expand_to_18_decimals(2),
            U256::from(expand_to_18_decimals(1)),
            dec!(0.0006),
        )
        .unwrap();

        assert_eq!(result.sqrt_ratio_next_x96, next_tick);
        assert_eq!(result.amount_in, U256::from(9975124224178055u64));
        assert_eq!(result.amount_out, U256::from(9925619580021728u64));
        assert_eq!(result.fee_amount, U256::from(5985074534507u64));
    }

    #[rstest]
    fn test_exact_amount_in_fully_spent_one_for_zero() {
        let price = encode(1, 1);
        let next_tick = encode(1000, 100);
        let amount = U256::from(expand_to_18_decimals(1));
        let result = compute_swap_step(
            price,
            next_tick,
            MAX_SQRT_RATIO - U160::from(1u8),
            false,
            expand_to_18_decimals(2),
            amount,
            dec!(0.0006),
        )
        .unwrap();

        assert!(result.sqrt_ratio_next_x96 < next_tick);
        assert_eq!(
            result.sqrt_ratio_next_x96,
            U160::from_str("118818475322642227089037862318").unwrap()
        );
        assert_eq!(result.amount_in, U256::from(999400000000000000u64));
        assert_eq!(result.amount_out, U256::from(666399946655997866u64));
        assert_eq!(result.fee_amount, U256::from(600000000000000u64));
        assert_eq!(result.amount_in + result.fee_amount, amount);
    }

    #[rstest]
    fn test_limit_nearer_than_next_tick_stops_at_limit() {
        let price = encode(1, 1);
        let limit = encode(101, 100);
        let result = compute_swap_step(
            price,
            encode(1000, 100),
            limit,
            false,
            expand_to_18_decimals(2),
            U256::from(expand_to_18_decimals(1)),
            dec!(0.0006),
        )
        .unwrap();

        assert_eq!(result.sqrt_ratio_next_x96, limit);
        assert_eq!(result.amount_in, U256::from(9975124224178055u64));
        assert_eq!(result.fee_amount, U256::from(5985074534507u64));
    }

    #[rstest]
    fn test_zero_liquidity_moves_to_target_for_free() {
        let price = encode(1, 1);
        let next_tick = encode(100, 101);
        let result = compute_swap_step(
            price,
            next_tick,
            MIN_SQRT_RATIO + U160::from(1u8),
            true,
            0,
            U256::from(1_000u64),
            dec!(0.003),
        )
        .unwrap();

        assert_eq!(result.sqrt_ratio_next_x96, next_tick);
        assert_eq!(result.amount_in, U256::ZERO);
        assert_eq!(result.amount_out, U256::ZERO);
        assert_eq!(result.fee_amount, U256::ZERO);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(0.0005))]
    #[case(dec!(0.003))]
    fn test_input_plus_fee_never_exceeds_remaining(#[case] fee_rate: Decimal) {
        for remaining in [1u64, 999, 1_000_003, 50_000_000_000_000_000] {
            let result = compute_swap_step(
                encode(1, 1),
                encode(1000, 100),
                MAX_SQRT_RATIO - U160::from(1u8),
                false,
                expand_to_18_decimals(2),
                U256::from(remaining),
                fee_rate,
            )
            .unwrap();
            assert!(result.amount_in + result.fee_amount <= U256::from(remaining));
        }
    }
}
