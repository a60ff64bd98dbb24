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

//! Identifiers for pools, incentive streams and liquidity positions.

use std::fmt::{Display, Formatter};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Identifies a pool.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PoolId(pub u64);

impl PoolId {
    /// Creates a new [`PoolId`] instance.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the custody address holding the pool's reserves.
    ///
    /// The address is the big-endian pool id right-aligned in 20 bytes.
    #[must_use]
    pub fn address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&self.0.to_be_bytes());
        Address::from_slice(&bytes)
    }
}

impl Display for PoolId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies an incentive stream within a pool.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IncentiveId(pub u64);

impl IncentiveId {
    /// Creates a new [`IncentiveId`] instance.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl Display for IncentiveId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a liquidity position: one owner's liquidity over one tick range of one pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    /// The pool the position belongs to.
    pub pool_id: PoolId,
    /// The owner of the position.
    pub owner: Address,
    /// The lower tick boundary of the position.
    pub lower_tick: i32,
    /// The upper tick boundary of the position.
    pub upper_tick: i32,
}

impl PositionKey {
    /// Creates a new [`PositionKey`] instance.
    #[must_use]
    pub const fn new(pool_id: PoolId, owner: Address, lower_tick: i32, upper_tick: i32) -> Self {
        Self {
            pool_id,
            owner,
            lower_tick,
            upper_tick,
        }
    }
}

impl Display for PositionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.pool_id, self.owner, self.lower_tick, self.upper_tick
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_pool_address_is_deterministic() {
        let address = PoolId::new(1).address();
        assert_eq!(address, address!("0x0000000000000000000000000000000000000001"));
        assert_ne!(PoolId::new(1).address(), PoolId::new(2).address());
    }

    #[rstest]
    fn test_position_key_display() {
        let owner = address!("0x1234567890123456789012345678901234567890");
        let key = PositionKey::new(PoolId::new(7), owner, -100, 100);
        assert_eq!(key.to_string(), format!("7/{owner}/-100/100"));
    }

    #[rstest]
    fn test_position_keys_order_by_pool_then_owner_then_range() {
        let owner = address!("0x1234567890123456789012345678901234567890");
        let a = PositionKey::new(PoolId::new(1), owner, -100, 100);
        let b = PositionKey::new(PoolId::new(1), owner, -50, 100);
        let c = PositionKey::new(PoolId::new(2), owner, -200, 100);
        assert!(a < b);
        assert!(b < c);
    }
}
