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

//! Position lifecycle: creating, increasing, withdrawing positions and collecting their fees.

use alloy_primitives::{Address, U160, U256};
use clamm_core::{ArithmeticError, Rounding};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    accum::{GrowthSnapshot, TokenAmounts},
    custody::{Coin, Custody},
    engine::LiquidityManager,
    error::ClammError,
    identifiers::{IncentiveId, PoolId, PositionKey},
    pool::{PoolLedger, PoolMetadata, PoolProvider},
    tick_map::{
        liquidity_math::{get_liquidity_for_amounts, liquidity_math_add},
        sqrt_price_math::{encode_sqrt_ratio_x96, get_amounts_for_liquidity},
        tick_math::{
            MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
            get_tick_at_sqrt_ratio,
        },
    },
};

/// Amounts deposited by a `create_position` call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPosition {
    /// Token0 deposited, rounded up.
    pub amount0: U256,
    /// Token1 deposited, rounded up.
    pub amount1: U256,
    /// Liquidity added to the position.
    pub liquidity: u128,
}

/// Amounts paid out by a `withdraw_position` call.
///
/// Fees and incentives are only claimed when the position is withdrawn in full, a partial
/// withdrawal leaves them accrued in the position's records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Withdrawal {
    /// Token0 principal withdrawn, rounded down.
    pub amount0: U256,
    /// Token1 principal withdrawn, rounded down.
    pub amount1: U256,
    /// Fees claimed.
    pub fees: TokenAmounts,
    /// Rewards claimed per incentive stream.
    pub incentives: IndexMap<IncentiveId, Coin>,
}

impl Withdrawal {
    /// Returns the principal plus the claimed fees, per token.
    ///
    /// # Errors
    ///
    /// Returns an error if a sum overflows.
    pub fn total_amounts(&self) -> Result<TokenAmounts, ArithmeticError> {
        TokenAmounts::new(self.amount0, self.amount1).checked_add(&self.fees)
    }
}

/// Checks whether a pool is still awaiting its first position.
///
/// True exactly when both the sqrt price and the current tick are zero. A pool where only one of
/// them is zero is not considered initial and is left as is.
#[must_use]
pub fn is_initial_position(sqrt_price: U160, current_tick: i32) -> bool {
    sqrt_price.is_zero() && current_tick == 0
}

/// Validates a position's tick range against the tick bounds and the pool's tick spacing.
///
/// # Errors
///
/// Returns an error if:
/// - Either tick lies outside `[MIN_TICK, MAX_TICK]`.
/// - `lower_tick >= upper_tick`.
/// - Either tick is not a multiple of `tick_spacing`.
pub fn validate_ticks(lower_tick: i32, upper_tick: i32, tick_spacing: u32) -> Result<(), ClammError> {
    if !(MIN_TICK..=MAX_TICK).contains(&lower_tick) {
        return Err(ClammError::InvalidTick {
            tick: lower_tick,
            is_lower: true,
        });
    }
    if !(MIN_TICK..=MAX_TICK).contains(&upper_tick) {
        return Err(ClammError::InvalidTick {
            tick: upper_tick,
            is_lower: false,
        });
    }
    if lower_tick >= upper_tick {
        return Err(ClammError::InvalidLowerUpperTick {
            lower_tick,
            upper_tick,
        });
    }

    let spacing = i32::try_from(tick_spacing).unwrap_or(i32::MAX);
    if spacing == 0 || lower_tick % spacing != 0 || upper_tick % spacing != 0 {
        return Err(ClammError::TickSpacing {
            tick_spacing,
            lower_tick,
            upper_tick,
        });
    }
    Ok(())
}

/// Derives the bootstrap price `sqrt(amount1 / amount0)` and its tick.
fn initial_price(amount0: U256, amount1: U256) -> Result<(U160, i32), ClammError> {
    if amount0.is_zero() || amount1.is_zero() {
        return Err(ClammError::InvalidInitialAmounts { amount0, amount1 });
    }
    let sqrt_price = encode_sqrt_ratio_x96(amount1, amount0)
        .map_err(|_| ClammError::InvalidInitialAmounts { amount0, amount1 })?;
    if sqrt_price < MIN_SQRT_RATIO || sqrt_price >= MAX_SQRT_RATIO {
        return Err(ClammError::InvalidInitialAmounts { amount0, amount1 });
    }
    Ok((sqrt_price, get_tick_at_sqrt_ratio(sqrt_price)))
}

fn to_liquidity_delta(liquidity: u128, negate: bool) -> Result<i128, ArithmeticError> {
    let delta = i128::try_from(liquidity).map_err(|_| ArithmeticError::Overflow)?;
    Ok(if negate { -delta } else { delta })
}

/// Applies a liquidity delta to a position and its boundary ticks on a working ledger.
///
/// Earned value is moved to the position's unclaimed balances before the liquidity changes, and
/// the snapshots are reset to the growth inside the range. Ticks left unreferenced by a removal
/// are cleared once the growth inside has been read.
fn modify_position(
    ledger: &mut PoolLedger,
    key: PositionKey,
    current_tick: i32,
    liquidity_delta: i128,
) -> Result<GrowthSnapshot, ClammError> {
    let globals = ledger.global_growth();
    let flipped_lower =
        ledger
            .ticks
            .update(key.lower_tick, current_tick, liquidity_delta, false, &globals)?;
    let flipped_upper =
        ledger
            .ticks
            .update(key.upper_tick, current_tick, liquidity_delta, true, &globals)?;

    let inside = ledger.growth_inside(key.lower_tick, key.upper_tick, current_tick)?;
    if ledger.positions.contains_key(&key) {
        ledger.accrue(&key, &inside)?;
    } else {
        ledger.initialize_position(key);
    }
    ledger.update_position_liquidity(&key, liquidity_delta, &inside)?;

    if key.lower_tick <= current_tick && current_tick < key.upper_tick {
        ledger.ticks.liquidity = liquidity_math_add(ledger.ticks.liquidity, liquidity_delta);
    }

    if liquidity_delta < 0 {
        if flipped_lower {
            ledger.ticks.clear(key.lower_tick);
        }
        if flipped_upper {
            ledger.ticks.clear(key.upper_tick);
        }
    }
    Ok(inside)
}

fn pair_coins(pool: &PoolMetadata, amount0: U256, amount1: U256) -> [Coin; 2] {
    [
        Coin {
            denom: pool.token0,
            amount: amount0,
        },
        Coin {
            denom: pool.token1,
            amount: amount1,
        },
    ]
}

impl<P: PoolProvider, C: Custody> LiquidityManager<P, C> {
    /// Creates a position, or adds liquidity to an existing one, from desired token amounts.
    ///
    /// The liquidity is the maximum the desired amounts can back at the current price, and the
    /// deposited amounts are derived from it rounding up. The first position of a pool sets its
    /// price to `sqrt(amount1_desired / amount0_desired)`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool does not exist.
    /// - The tick range is invalid.
    /// - The pool is being bootstrapped and either desired amount is zero.
    /// - The resulting liquidity is zero.
    /// - Either deposited amount is below its minimum.
    /// - A boundary tick would exceed the maximum liquidity per tick.
    /// - The owner cannot fund the deposit.
    ///
    /// No state changes on error.
    #[allow(clippy::too_many_arguments)]
    pub fn create_position(
        &mut self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
        amount0_desired: U256,
        amount1_desired: U256,
        amount0_min: U256,
        amount1_min: U256,
    ) -> Result<CreatedPosition, ClammError> {
        let mut pool = self.pools.pool(pool_id)?;
        validate_ticks(lower_tick, upper_tick, pool.tick_spacing)?;

        let bootstrap = is_initial_position(pool.sqrt_price, pool.current_tick);
        if bootstrap {
            let (sqrt_price, tick) = initial_price(amount0_desired, amount1_desired)?;
            pool.sqrt_price = sqrt_price;
            pool.current_tick = tick;
        }

        let liquidity = get_liquidity_for_amounts(
            pool.sqrt_price,
            get_sqrt_ratio_at_tick(lower_tick),
            get_sqrt_ratio_at_tick(upper_tick),
            amount0_desired,
            amount1_desired,
        )?;
        if liquidity == 0 {
            return Err(ClammError::ZeroLiquidity);
        }

        let (amount0, amount1) = get_amounts_for_liquidity(
            pool.sqrt_price,
            lower_tick,
            upper_tick,
            liquidity,
            Rounding::Up,
        )?;
        if amount0 < amount0_min {
            return Err(ClammError::InsufficientLiquidityCreated {
                actual: amount0,
                minimum: amount0_min,
                is_token_zero: true,
            });
        }
        if amount1 < amount1_min {
            return Err(ClammError::InsufficientLiquidityCreated {
                actual: amount1,
                minimum: amount1_min,
                is_token_zero: false,
            });
        }

        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        let liquidity_delta = to_liquidity_delta(liquidity, false)?;
        let mut ledger = self.working_ledger(&pool);
        modify_position(&mut ledger, key, pool.current_tick, liquidity_delta)?;
        if let Some(position) = ledger.positions.get_mut(&key) {
            position.update_amounts(liquidity_delta, amount0, amount1)?;
        }

        let coins = pair_coins(&pool, amount0, amount1);
        self.transfer(owner, pool.address(), &coins)?;
        if bootstrap
            && let Err(e) = self
                .pools
                .update_price(pool_id, pool.sqrt_price, pool.current_tick)
        {
            self.transfer(pool.address(), owner, &coins)?;
            return Err(e);
        }
        self.commit(ledger);

        if bootstrap {
            tracing::info!(
                "Initialized pool {pool_id} at sqrt_price={} tick={}",
                pool.sqrt_price,
                pool.current_tick
            );
        }
        tracing::info!(
            "Created position {key}: liquidity={liquidity}, amount0={amount0}, amount1={amount1}"
        );

        Ok(CreatedPosition {
            amount0,
            amount1,
            liquidity,
        })
    }

    /// Withdraws `liquidity` from a position, paying the principal out rounding down.
    ///
    /// Withdrawing the full liquidity also claims every fee and incentive stream and removes the
    /// position.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool does not exist.
    /// - The tick range is invalid.
    /// - The position does not exist.
    /// - `liquidity` is zero or exceeds the position's liquidity.
    /// - The pool cannot pay the withdrawal.
    ///
    /// No state changes on error.
    pub fn withdraw_position(
        &mut self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
        liquidity: u128,
    ) -> Result<Withdrawal, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        validate_ticks(lower_tick, upper_tick, pool.tick_spacing)?;

        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        let mut ledger = self.working_ledger(&pool);
        let available = ledger
            .positions
            .get(&key)
            .map(|position| position.liquidity)
            .ok_or_else(|| ClammError::position_not_found(&key))?;
        if liquidity == 0 {
            return Err(ClammError::ZeroLiquidity);
        }
        if liquidity > available {
            return Err(ClammError::InsufficientLiquidity {
                actual: liquidity,
                available,
            });
        }

        let (amount0, amount1) = get_amounts_for_liquidity(
            pool.sqrt_price,
            lower_tick,
            upper_tick,
            liquidity,
            Rounding::Down,
        )?;

        let liquidity_delta = to_liquidity_delta(liquidity, true)?;
        let inside = modify_position(&mut ledger, key, pool.current_tick, liquidity_delta)?;
        if let Some(position) = ledger.positions.get_mut(&key) {
            position.update_amounts(liquidity_delta, amount0, amount1)?;
        }

        let mut withdrawal = Withdrawal {
            amount0,
            amount1,
            ..Default::default()
        };
        let full = liquidity == available;
        if full {
            withdrawal.fees = ledger.claim_fees(&key, &inside)?;
            withdrawal.incentives = ledger.claim_incentives(&key, &inside)?;
            ledger.remove_position(&key);
        }

        let payout = withdrawal.total_amounts()?;
        let mut coins = pair_coins(&pool, payout.amount0, payout.amount1).to_vec();
        coins.extend(withdrawal.incentives.values().cloned());
        self.transfer(pool.address(), owner, &coins)?;
        self.commit(ledger);

        tracing::info!(
            "Withdrew {liquidity} liquidity from position {key}: amount0={amount0}, amount1={amount1}{}",
            if full { " (closed)" } else { "" }
        );
        Ok(withdrawal)
    }

    /// Claims and pays out the fees earned by a position.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pool or the position does not exist.
    /// - The pool cannot pay the fees.
    pub fn collect_fees(
        &mut self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: i32,
        upper_tick: i32,
    ) -> Result<TokenAmounts, ClammError> {
        let pool = self.pools.pool(pool_id)?;
        let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick);
        let mut ledger = self.working_ledger(&pool);
        if !ledger.positions.contains_key(&key) {
            return Err(ClammError::position_not_found(&key));
        }

        let inside = ledger.growth_inside(lower_tick, upper_tick, pool.current_tick)?;
        let fees = ledger.claim_fees(&key, &inside)?;
        self.transfer(
            pool.address(),
            owner,
            &pair_coins(&pool, fees.amount0, fees.amount1),
        )?;
        self.commit(ledger);

        tracing::info!(
            "Collected fees for position {key}: amount0={}, amount1={}",
            fees.amount0,
            fees.amount1
        );
        Ok(fees)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(U160::ZERO, 0, true)]
    #[case(U160::ZERO, 5, false)]
    #[case(U160::from(1u8), 0, false)]
    #[case(U160::from(1u8), -3, false)]
    fn test_is_initial_position(
        #[case] sqrt_price: U160,
        #[case] tick: i32,
        #[case] expected: bool,
    ) {
        assert_eq!(is_initial_position(sqrt_price, tick), expected);
    }

    #[rstest]
    #[case(-100, 100, 10, Ok(()))]
    #[case(MIN_TICK, MAX_TICK, 1, Ok(()))]
    #[case(MIN_TICK - 1, 0, 1, Err(ClammError::InvalidTick { tick: MIN_TICK - 1, is_lower: true }))]
    #[case(0, MAX_TICK + 1, 1, Err(ClammError::InvalidTick { tick: MAX_TICK + 1, is_lower: false }))]
    #[case(100, 100, 10, Err(ClammError::InvalidLowerUpperTick { lower_tick: 100, upper_tick: 100 }))]
    #[case(100, -100, 10, Err(ClammError::InvalidLowerUpperTick { lower_tick: 100, upper_tick: -100 }))]
    #[case(-105, 100, 10, Err(ClammError::TickSpacing { tick_spacing: 10, lower_tick: -105, upper_tick: 100 }))]
    #[case(-100, 100, 0, Err(ClammError::TickSpacing { tick_spacing: 0, lower_tick: -100, upper_tick: 100 }))]
    fn test_validate_ticks(
        #[case] lower: i32,
        #[case] upper: i32,
        #[case] spacing: u32,
        #[case] expected: Result<(), ClammError>,
    ) {
        assert_eq!(validate_ticks(lower, upper, spacing), expected);
    }

    #[rstest]
    fn test_initial_price_from_equal_amounts_is_tick_zero() {
        let (sqrt_price, tick) = initial_price(U256::from(1000u64), U256::from(1000u64)).unwrap();
        assert_eq!(sqrt_price, U160::from(1u8) << 96);
        assert_eq!(tick, 0);
    }

    #[rstest]
    #[case(U256::ZERO, U256::from(1u8))]
    #[case(U256::from(1u8), U256::ZERO)]
    fn test_initial_price_requires_both_amounts(#[case] amount0: U256, #[case] amount1: U256) {
        assert_eq!(
            initial_price(amount0, amount1),
            Err(ClammError::InvalidInitialAmounts { amount0, amount1 })
        );
    }

    #[rstest]
    fn test_initial_price_above_two_pow_64_is_accepted() {
        let (sqrt_price, tick) = initial_price(U256::from(1u8), U256::from(1u8) << 70).unwrap();
        assert_eq!(sqrt_price, U160::from(1u8) << 131);
        assert!(tick > 0);
        assert!(get_sqrt_ratio_at_tick(tick) <= sqrt_price);
        assert!(get_sqrt_ratio_at_tick(tick + 1) > sqrt_price);
    }

    #[rstest]
    #[case(U256::MAX, U256::from(1u8))]
    #[case(U256::from(1u8), U256::MAX)]
    #[case(U256::from(1u8), U256::from(1u8) << 128)]
    fn test_initial_price_outside_bounds_is_rejected(
        #[case] amount0: U256,
        #[case] amount1: U256,
    ) {
        assert_eq!(
            initial_price(amount0, amount1),
            Err(ClammError::InvalidInitialAmounts { amount0, amount1 })
        );
    }

    #[rstest]
    fn test_withdrawal_total_amounts() {
        let mut withdrawal = Withdrawal {
            amount0: U256::from(100u8),
            amount1: U256::from(7u8),
            fees: TokenAmounts::new(U256::from(3u8), U256::ZERO),
            ..Default::default()
        };
        assert_eq!(
            withdrawal.total_amounts(),
            Ok(TokenAmounts::new(U256::from(103u8), U256::from(7u8)))
        );

        withdrawal.fees.amount1 = U256::MAX;
        assert_eq!(withdrawal.total_amounts(), Err(ArithmeticError::Overflow));
    }

    #[rstest]
    fn test_to_liquidity_delta() {
        assert_eq!(to_liquidity_delta(5, false), Ok(5));
        assert_eq!(to_liquidity_delta(5, true), Ok(-5));
        assert_eq!(
            to_liquidity_delta(u128::MAX, false),
            Err(ArithmeticError::Overflow)
        );
    }
}
