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

//! Conversions between ticks and Q64.96 sqrt prices.
//!
//! Each tick is a 1 basis point (1.0001) step in price, so the sqrt price at tick `i` is
//! `sqrt(1.0001^i) * 2^96`.

use alloy_primitives::{U160, U256};

/// Minimum tick usable by any pool.
pub const MIN_TICK: i32 = -887272;
/// Maximum tick usable by any pool.
pub const MAX_TICK: i32 = -MIN_TICK;

/// The sqrt price at [`MIN_TICK`].
pub const MIN_SQRT_RATIO: U160 = U160::from_limbs([4295128739, 0, 0]);
/// The sqrt price at [`MAX_TICK`].
pub const MAX_SQRT_RATIO: U160 = U160::from_limbs([
    0x5d951d5263988d26,
    0xefd1fc6a50648849,
    0xfffd8963,
]);

const RATIO_MULTIPLIERS: [(u32, u128); 19] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x9aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x5d6af8dedb81196699c329225ee604),
    (0x40000, 0x2216e584f5fa1ea926041bedfe98),
    (0x80000, 0x48a170391f7dc42444e8fa2),
];

/// Calculates the sqrt price at `tick` as a Q64.96 number.
///
/// The final Q128.128 to Q64.96 conversion rounds up, so the result is always at least the
/// exact value.
///
/// # Panics
///
/// Panics if `tick` is outside [[`MIN_TICK`], [`MAX_TICK`]].
#[must_use]
pub fn get_sqrt_ratio_at_tick(tick: i32) -> U160 {
    assert!(
        (MIN_TICK..=MAX_TICK).contains(&tick),
        "Tick {tick} out of bounds [{MIN_TICK}, {MAX_TICK}]"
    );
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        U256::from(1u8) << 128
    };
    for (bit, multiplier) in RATIO_MULTIPLIERS {
        if abs_tick & bit != 0 {
            ratio = (ratio * U256::from(multiplier)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 to Q64.96, rounding up
    let remainder_mask: U256 = (U256::from(1u8) << 32) - U256::from(1u8);
    let rounding = if (ratio & remainder_mask).is_zero() {
        U256::ZERO
    } else {
        U256::from(1u8)
    };
    U160::from((ratio >> 32) + rounding)
}

/// Calculates the greatest tick whose sqrt price is less than or equal to `sqrt_price_x96`.
///
/// # Panics
///
/// Panics if `sqrt_price_x96` is outside [[`MIN_SQRT_RATIO`], [`MAX_SQRT_RATIO`]).
#[must_use]
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U160) -> i32 {
    assert!(
        sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO,
        "Sqrt price {sqrt_price_x96} out of bounds"
    );

    // Ratio is monotonic in the tick, binary search over the full range
    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(mid) <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;
    use crate::tick_map::sqrt_price_math::encode_sqrt_ratio_x96;

    #[rstest]
    fn test_bounds_match_constants() {
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO,
            U160::from_str("1461446703485210103287273052203988822378723970342").unwrap()
        );
    }

    #[rstest]
    fn test_tick_zero_is_price_one() {
        assert_eq!(get_sqrt_ratio_at_tick(0), U160::from(1u8) << 96);
        let one = encode_sqrt_ratio_x96(U256::from(1u8), U256::from(1u8)).unwrap();
        assert_eq!(get_tick_at_sqrt_ratio(one), 0);
    }

    #[rstest]
    #[should_panic(expected = "Tick 887273 out of bounds")]
    fn test_get_sqrt_ratio_at_tick_above_max() {
        let _ = get_sqrt_ratio_at_tick(MAX_TICK + 1);
    }

    #[rstest]
    #[should_panic(expected = "Tick -887273 out of bounds")]
    fn test_get_sqrt_ratio_at_tick_below_min() {
        let _ = get_sqrt_ratio_at_tick(MIN_TICK - 1);
    }

    #[rstest]
    fn test_sqrt_ratio_is_monotonic() {
        let ticks = [MIN_TICK, -100_000, -1000, -100, -1, 0, 1, 100, 1000, 100_000, MAX_TICK];
        for pair in ticks.windows(2) {
            assert!(get_sqrt_ratio_at_tick(pair[0]) < get_sqrt_ratio_at_tick(pair[1]));
        }
    }

    #[rstest]
    #[case(MIN_TICK)]
    #[case(-50_000)]
    #[case(-101)]
    #[case(-1)]
    #[case(0)]
    #[case(1)]
    #[case(150)]
    #[case(50_000)]
    #[case(MAX_TICK - 1)]
    fn test_tick_at_sqrt_ratio_inverts_exact_prices(#[case] tick: i32) {
        let price = get_sqrt_ratio_at_tick(tick);
        assert_eq!(get_tick_at_sqrt_ratio(price), tick);
        if tick < MAX_TICK - 1 {
            let next = get_sqrt_ratio_at_tick(tick + 1);
            assert_eq!(get_tick_at_sqrt_ratio(next - U160::from(1u8)), tick);
        }
    }

    #[rstest]
    #[should_panic(expected = "out of bounds")]
    fn test_get_tick_at_max_sqrt_ratio_panics() {
        let _ = get_tick_at_sqrt_ratio(MAX_SQRT_RATIO);
    }
}
