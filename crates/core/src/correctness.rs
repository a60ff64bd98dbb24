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

//! Functions for correctness checks similar to the *design by contract* philosophy.
//!
//! An [`anyhow::Result`] is returned with a descriptive message when the
//! condition check fails.

use rust_decimal::Decimal;

/// Message prefix for a failed condition check.
pub const FAILED: &str = "Condition failed";

/// Checks the `predicate` is true.
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_predicate_true(predicate: bool, fail_msg: &str) -> anyhow::Result<()> {
    if !predicate {
        anyhow::bail!("{fail_msg}")
    }
    Ok(())
}

/// Checks the `u128` value is positive (> 0).
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_positive_u128(value: u128, param: &str) -> anyhow::Result<()> {
    if value == 0 {
        anyhow::bail!("invalid u128 for '{param}' not positive, was {value}")
    }
    Ok(())
}

/// Checks the `i32` value is in range [`l`, `r`] (inclusive).
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_in_range_inclusive_i32(value: i32, l: i32, r: i32, param: &str) -> anyhow::Result<()> {
    if value < l || value > r {
        anyhow::bail!("invalid i32 for '{param}' not in range [{l}, {r}], was {value}")
    }
    Ok(())
}

/// Checks the `i32` value is an exact multiple of `step`.
///
/// # Errors
///
/// Returns an error if `step` is not positive or the value is not a multiple of it.
pub fn check_multiple_of_i32(value: i32, step: i32, param: &str) -> anyhow::Result<()> {
    if step <= 0 {
        anyhow::bail!("invalid step for '{param}' not positive, was {step}")
    }
    if value % step != 0 {
        anyhow::bail!("invalid i32 for '{param}' not a multiple of {step}, was {value}")
    }
    Ok(())
}

/// Checks the `Decimal` value is in range [`l`, `r`) (right exclusive).
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_in_range_right_exclusive_decimal(
    value: Decimal,
    l: Decimal,
    r: Decimal,
    param: &str,
) -> anyhow::Result<()> {
    if value < l || value >= r {
        anyhow::bail!("invalid Decimal for '{param}' not in range [{l}, {r}), was {value}")
    }
    Ok(())
}

/// Checks the slice is **not** empty.
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_slice_not_empty<T>(slice: &[T], param: &str) -> anyhow::Result<()> {
    if slice.is_empty() {
        anyhow::bail!(
            "the '{param}' slice `&[{}]` was empty",
            std::any::type_name::<T>()
        )
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
