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

//! Accounting core for a concentrated-liquidity automated market maker.
//!
//! The `clamm-model` crate tracks, per price range, how much liquidity is deposited, how trading
//! fees and incentive rewards accrue to that liquidity, and how a swap consumes liquidity
//! tick-by-tick while charging fees:
//!
//! - [`tick_map`]: the per-pool tick store together with tick, sqrt-price and liquidity math.
//! - [`accum`]: the generic growth accumulator shared by the fee stream and every incentive stream.
//! - [`swap`]: the per-step fee calculator and the swap step computation.
//! - [`engine`]: position lifecycle, fee/incentive collection and the swap walker.
//! - [`pool`] and [`custody`]: the collaborator interfaces (pool metadata, token custody) with
//!   in-memory implementations.
//!
//! Every externally triggered operation mutates a working copy of the pool ledger and commits it
//! only once every step, including the custody transfer, has succeeded.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod accum;
pub mod config;
pub mod custody;
pub mod engine;
pub mod error;
pub mod identifiers;
pub mod logging;
pub mod pool;
pub mod swap;
pub mod tick_map;

pub use crate::{
    config::ClammConfig,
    engine::LiquidityManager,
    error::{ClammError, ErrorKind},
};
