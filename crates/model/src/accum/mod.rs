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

//! The growth accumulator engine.
//!
//! A single generic [`Accumulator`] implements the "growth outside" accounting for both the fee
//! stream ([`FeeAccumulator`]) and every incentive stream ([`IncentiveAccumulator`]) of a pool.

use alloy_primitives::I256;

use crate::identifiers::{IncentiveId, PoolId};

pub mod accumulator;
pub mod growth;

pub use crate::accum::{
    accumulator::{Accumulator, AccumulatorPosition},
    growth::{GrowthSnapshot, GrowthValue, TokenAmounts, TokenGrowth},
};

/// Accumulator of a pool's trading fees.
pub type FeeAccumulator = Accumulator<TokenGrowth>;

/// Accumulator of one incentive stream of a pool.
pub type IncentiveAccumulator = Accumulator<I256>;

/// Returns the key namespace of a pool's fee accumulator.
#[must_use]
pub fn fee_accumulator_name(pool_id: PoolId) -> String {
    format!("fee/{pool_id}")
}

/// Returns the key namespace of an incentive stream's accumulator.
#[must_use]
pub fn incentive_accumulator_name(pool_id: PoolId, incentive_id: IncentiveId) -> String {
    format!("incentive/{pool_id}/{incentive_id}")
}
