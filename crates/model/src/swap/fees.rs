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
    math::{checked_sub, mul_decimal},
};
use rust_decimal::Decimal;

/// Computes the fee charged for one swap step.
///
/// `current_sqrt_price` is the price the step ended at. When the step ended on the next tick or
/// on the price limit, the whole tick's input paid for principal and the fee is `amount_in *
/// fee_rate` rounded up. Otherwise the step exhausted the swap and whatever input is left after
/// principal is the fee.
///
/// # Errors
///
/// Returns an error if:
/// - The fee computation overflows.
/// - `amount_in` exceeds `amount_remaining` on a step that did not reach its target.
///
/// # Panics
///
/// Panics if `fee_rate` is negative.
pub fn fee_for_step(
    current_sqrt_price: U160,
    next_tick_sqrt_price: U160,
    sqrt_price_limit: U160,
    amount_in: U256,
    amount_remaining: U256,
    fee_rate: Decimal,
) -> Result<U256, ArithmeticError> {
    assert!(
        !fee_rate.is_sign_negative() || fee_rate.is_zero(),
        "Fee rate must be non-negative, was {fee_rate}"
    );

    if fee_rate.is_zero() {
        return Ok(U256::ZERO);
    }

    if current_sqrt_price == next_tick_sqrt_price || current_sqrt_price == sqrt_price_limit {
        mul_decimal(amount_in, fee_rate, Rounding::Up)
    } else {
        checked_sub(amount_remaining, amount_in)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
