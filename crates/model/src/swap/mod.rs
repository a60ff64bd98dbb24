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

//! Swap step fee calculation and the single-step swap computation used by the swap walker.

use alloy_primitives::{U160, U256};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

pub mod fees;
pub mod swap_math;

pub use crate::swap::{
    fees::fee_for_step,
    swap_math::{SwapStepResult, compute_swap_step},
};

/// The outcome of an exact-input swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    /// Denom paid in by the sender.
    pub token_in: Ustr,
    /// Denom paid out to the sender.
    pub token_out: Ustr,
    /// Input consumed, fees included.
    pub amount_in: U256,
    /// Output paid to the sender.
    pub amount_out: U256,
    /// Total fee charged, in `token_in`.
    pub fee: U256,
    /// Pool sqrt price after the swap.
    pub sqrt_price: U160,
    /// Pool current tick after the swap.
    pub tick: i32,
    /// Number of initialized ticks crossed.
    pub ticks_crossed: u32,
}
