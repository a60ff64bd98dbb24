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

//! Errors returned by the accounting core.
//!
//! Validation and economic-guard errors are always detected before any state is mutated.
//! Arithmetic errors abort the current operation and are surfaced as a distinct kind since they
//! indicate malicious input or a logic defect. Bookkeeping invariant violations are not errors:
//! they panic.

use alloy_primitives::U256;
use clamm_core::ArithmeticError;
use rust_decimal::Decimal;
use strum::{AsRefStr, Display};
use ustr::Ustr;

use crate::{
    custody::CustodyError,
    identifiers::{IncentiveId, PoolId, PositionKey},
};

/// The category of a [`ClammError`].
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or unknown inputs: tick ranges, spacing, pools, positions.
    Validation,
    /// A caller-specified economic bound was not met.
    Economic,
    /// Overflow, division by zero or an unexpected negative value.
    Arithmetic,
    /// The custody collaborator refused a transfer.
    Custody,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClammError {
    #[error("Pool {pool_id} not found")]
    PoolNotFound { pool_id: PoolId },
    #[error("Pool {pool_id} already exists")]
    PoolAlreadyExists { pool_id: PoolId },
    #[error("Pool {pool_id} has no price yet, a position must bootstrap it first")]
    PoolNotInitialized { pool_id: PoolId },
    #[error("Invalid tick {tick} (is_lower={is_lower}), must be within [-887272, 887272]")]
    InvalidTick { tick: i32, is_lower: bool },
    #[error("Lower tick {lower_tick} must be less than upper tick {upper_tick}")]
    InvalidLowerUpperTick { lower_tick: i32, upper_tick: i32 },
    #[error("Ticks {lower_tick} and {upper_tick} must be multiples of the tick spacing {tick_spacing}")]
    TickSpacing {
        tick_spacing: u32,
        lower_tick: i32,
        upper_tick: i32,
    },
    #[error("Pool tokens must differ, both were {denom}")]
    DuplicateDenom { denom: Ustr },
    #[error("Tick spacing {tick_spacing} is not authorized")]
    UnauthorizedTickSpacing { tick_spacing: u32 },
    #[error("Fee rate {fee_rate} is not authorized")]
    UnauthorizedFeeRate { fee_rate: Decimal },
    #[error("Position in pool {pool_id} over [{lower_tick}, {upper_tick}] not found")]
    PositionNotFound {
        pool_id: PoolId,
        lower_tick: i32,
        upper_tick: i32,
    },
    #[error("Liquidity delta calculated equals zero")]
    ZeroLiquidity,
    #[error("The initial position must deposit both tokens, was amount0={amount0}, amount1={amount1}")]
    InvalidInitialAmounts { amount0: U256, amount1: U256 },
    #[error(
        "Insufficient liquidity created: {actual} below minimum {minimum} (is_token_zero={is_token_zero})"
    )]
    InsufficientLiquidityCreated {
        actual: U256,
        minimum: U256,
        is_token_zero: bool,
    },
    #[error("Insufficient liquidity: requested {actual}, available {available}")]
    InsufficientLiquidity { actual: u128, available: u128 },
    #[error("Liquidity gross {liquidity_gross} at tick {tick} exceeds maximum per tick {max}")]
    MaxLiquidityPerTickExceeded {
        tick: i32,
        liquidity_gross: u128,
        max: u128,
    },
    #[error("Incentive {incentive_id} not found in pool {pool_id}")]
    IncentiveNotFound {
        pool_id: PoolId,
        incentive_id: IncentiveId,
    },
    #[error("Denom {denom} is not traded in pool {pool_id}")]
    DenomNotInPool { pool_id: PoolId, denom: Ustr },
    #[error("Invalid sqrt price limit {limit} for current sqrt price {current}")]
    InvalidSqrtPriceLimit { limit: U256, current: U256 },
    #[error("Insufficient amount out: {actual} below minimum {minimum}")]
    InsufficientAmountOut { actual: U256, minimum: U256 },
    #[error("Pool {pool_id} has no active liquidity")]
    NoActiveLiquidity { pool_id: PoolId },
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    Custody(#[from] CustodyError),
}

impl ClammError {
    /// Creates a [`ClammError::PositionNotFound`] for `key`.
    #[must_use]
    pub const fn position_not_found(key: &PositionKey) -> Self {
        Self::PositionNotFound {
            pool_id: key.pool_id,
            lower_tick: key.lower_tick,
            upper_tick: key.upper_tick,
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroLiquidity
            | Self::InsufficientLiquidityCreated { .. }
            | Self::InsufficientLiquidity { .. }
            | Self::InsufficientAmountOut { .. } => ErrorKind::Economic,
            Self::Arithmetic(_) => ErrorKind::Arithmetic,
            Self::Custody(_) => ErrorKind::Custody,
            _ => ErrorKind::Validation,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
