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

//! Tracing subscriber setup.
//!
//! The accounting core emits `tracing` events: `debug!` when a tick flips or is crossed and
//! `info!` for every position, incentive and swap operation. Nothing is printed unless a
//! subscriber is installed.

use std::env;

use tracing_subscriber::EnvFilter;

/// The environment variable holding the tracing filter directives.
pub const LOG_ENV_VAR: &str = "RUST_LOG";

/// Initialize tracing from the `RUST_LOG` environment variable.
///
/// Does nothing when the variable is not set. Should only be called once, at the start of the
/// host application.
///
/// # Errors
///
/// Returns an error if the directives are invalid or a global subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    match env::var(LOG_ENV_VAR) {
        Ok(directives) => init_tracing_with(&directives),
        Err(_) => Ok(()),
    }
}

/// Initialize tracing with explicit filter directives, e.g. `clamm_model=debug`.
///
/// # Errors
///
/// Returns an error if the directives are invalid or a global subscriber is already installed.
pub fn init_tracing_with(directives: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(directives)
        .map_err(|e| anyhow::anyhow!("Invalid tracing directives '{directives}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

    tracing::debug!("Initialized tracing logs with {LOG_ENV_VAR}={directives}");
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
