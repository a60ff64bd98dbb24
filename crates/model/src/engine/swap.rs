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

//! The swap walker: exact-input swaps stepping through initialized ticks.

use alloy_primitives::{Address, U160, U256};
use clamm_core::math::{checked_add, checked_sub};
use ustr::Ustr;

use crate::{
    accum::growth::growth_per_liquidity,
    custody::{Coin, Custody},
    engine::LiquidityManager,
    error::ClammError,
    identifiers::PoolId,
    pool::PoolProvider,
    swap::{SwapResult, compute_swap_step},
    tick_map::{
        liquidity_math::liquidity_math_add,
        tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio},
    },
};

/// Returns the price limit used when a swap does not specify one.
#[must_use]
pub fn default_sqrt_price_limit(zero_for_one: bool) -> U160 {
    if zero_for_one {
        MIN_SQRT_RATIO + U160::from(1u8)
    } else {
        MAX_SQRT_RATIO - U160::from(1u8)
    }
}

fn validate_sqrt_price_limit(
    limit: U160,
    current: U160,
    zero_for_one: bool,
) -> Result<(), ClammError> {
    let valid = if zero_for_one {
        limit < current && limit > MIN_SQRT_RATIO
    } else {
        limit > current && limit < MAX_SQRT_RATIO
    };
    if valid {
        Ok(())
    } else {
        Err(ClammError::InvalidSqrtPriceLimit {
            limit: U256::from(limit),
            current: U256::from(current),
        })
    }
}

impl<P: PoolProvider, C: Custody> LiquidityManager<P, C> {
    /// Swaps `amount_in` of `token_in` for the pool's other token.
    ///
    /// The swap walks initialized ticks in price order until the input is spent or the price
    /// reaches `sqrt_price_limit`. Each step's fee accrues to the liquidity active during that
    /// step, and crossing a tick flips the growth-outside of every stream.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool does not exist or has no price yet.
    /// - `token_in` is not traded in the pool.
    /// - `sqrt_price_limit` lies on the wrong side of the current price or outside the bounds.
    /// - The output is below `min_amount_out`.
    /// - The sender cannot pay the input or the pool cannot pay the output.
    ///
    /// No state changes on error.
    pub fn swap_exact_in(
        &mut self,
        pool_id: PoolId,
        sender: Address,
        token_in: &str,
        amount_in: U256,
        sqrt_price_limit: Option<U160>,
        min_amount_out: U256,
    ) -> Result<SwapResult, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        if pool.sqrt_price.is_zero() {
            return Err(ClammError::PoolNotInitialized { pool_id });
        }

        let token_in = Ustr::from(token_in);
        let zero_for_one = pool.is_token_zero(token_in)?;
        let token_out = if zero_for_one {
            pool.token1
        } else {
            pool.token0
        };
        let limit = sqrt_price_limit.unwrap_or_else(|| default_sqrt_price_limit(zero_for_one));
        validate_sqrt_price_limit(limit, pool.sqrt_price, zero_for_one)?;

        let mut ledger = self.working_ledger(&pool);
        let mut sqrt_price = pool.sqrt_price;
        let mut current_tick = pool.current_tick;
        let mut amount_remaining = amount_in;
        let mut amount_out = U256::ZERO;
        let mut fee = U256::ZERO;
        let mut ticks_crossed = 0u32;

        while !amount_remaining.is_zero() && sqrt_price != limit {
            let sqrt_price_start = sqrt_price;
            let (tick_next, initialized) = ledger
                .ticks
                .next_initialized_tick(current_tick, zero_for_one);
            let sqrt_price_next = get_sqrt_ratio_at_tick(tick_next);
            let liquidity = ledger.active_liquidity();

            let step = compute_swap_step(
                sqrt_price,
                sqrt_price_next,
                limit,
                zero_for_one,
                liquidity,
                amount_remaining,
                pool.fee_rate,
            )?;
            sqrt_price = step.sqrt_ratio_next_x96;
            amount_remaining = checked_sub(
                amount_remaining,
                checked_add(step.amount_in, step.fee_amount)?,
            )?;
            amount_out = checked_add(amount_out, step.amount_out)?;
            fee = checked_add(fee, step.fee_amount)?;

            if liquidity > 0 && !step.fee_amount.is_zero() {
                let growth = growth_per_liquidity(step.fee_amount, liquidity)?;
                ledger.charge_fee(growth, zero_for_one)?;
            }

            if sqrt_price == sqrt_price_next {
                if initialized {
                    let globals = ledger.global_growth();
                    let crossed = ledger.ticks.cross_tick(tick_next, &globals)?;
                    // Crossing down leaves the range the tick's net liquidity was added for
                    let liquidity_net = if zero_for_one {
                        -crossed.liquidity_net
                    } else {
                        crossed.liquidity_net
                    };
                    ledger.ticks.liquidity = liquidity_math_add(ledger.ticks.liquidity, liquidity_net);
                    ticks_crossed += 1;
                }
                current_tick = if zero_for_one { tick_next - 1 } else { tick_next };
            } else if sqrt_price != sqrt_price_start {
                current_tick = get_tick_at_sqrt_ratio(sqrt_price);
            }
        }

        if amount_out < min_amount_out {
            return Err(ClammError::InsufficientAmountOut {
                actual: amount_out,
                minimum: min_amount_out,
            });
        }

        let amount_in = checked_sub(amount_in, amount_remaining)?;
        let coin_in = [Coin {
            denom: token_in,
            amount: amount_in,
        }];
        let coin_out = [Coin {
            denom: token_out,
            amount: amount_out,
        }];
        let pool_address = pool.address();

        self.transfer(sender, pool_address, &coin_in)?;
        if let Err(e) = self.transfer(pool_address, sender, &coin_out) {
            self.transfer(pool_address, sender, &coin_in)?;
            return Err(e);
        }
        if let Err(e) = self.pools.update_price(pool_id, sqrt_price, current_tick) {
            self.transfer(sender, pool_address, &coin_out)?;
            self.transfer(pool_address, sender, &coin_in)?;
            return Err(e);
        }
        self.commit(ledger);

        tracing::info!(
            "Swapped {amount_in} {token_in} for {amount_out} {token_out} in pool {pool_id} \
             (fee={fee}, tick {} -> {current_tick}, crossed={ticks_crossed})",
            pool.current_tick
        );

        Ok(SwapResult {
            token_in,
            token_out,
            amount_in,
            amount_out,
            fee,
            sqrt_price,
            tick: current_tick,
            ticks_crossed,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
