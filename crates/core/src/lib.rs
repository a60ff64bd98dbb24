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

//! Fixed-point math and correctness checks for the concentrated-liquidity accounting core.
//!
//! The `clamm-core` crate is the shared numeric layer used by every accounting component.
//! It supplies:
//!
//! - Rounding-aware multiply/divide primitives over 256-bit integers with a 512-bit intermediate.
//! - Q64.96 and Q128.128 scaling constants.
//! - Exact application of decimal rates (fee rates) to integer amounts.
//! - Correctness validation functions returning `anyhow::Result`.
//!
//! All rounding-direction decisions are expressed through [`math::Rounding`] so that call
//! sites state explicitly whether they round in favour of the pool or the user.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod correctness;
pub mod math;

pub use crate::math::{ArithmeticError, Rounding};
