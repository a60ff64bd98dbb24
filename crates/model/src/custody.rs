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

//! Token custody: the collaborator that moves token balances between accounts.

use ahash::AHashMap;
use alloy_primitives::{Address, U256};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// An amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// The token denomination.
    pub denom: Ustr,
    /// The amount in the token's smallest unit.
    pub amount: U256,
}

impl Coin {
    /// Creates a new [`Coin`] instance.
    #[must_use]
    pub fn new(denom: &str, amount: U256) -> Self {
        Self {
            denom: Ustr::from(denom),
            amount,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Insufficient funds: balance {balance} {denom} is less than required {required} {denom}")]
    InsufficientFunds {
        denom: Ustr,
        balance: U256,
        required: U256,
    },
    #[error("Balance overflow for {denom}")]
    Overflow { denom: Ustr },
}

/// Moves token balances between accounts.
///
/// Implementations must apply each call atomically: either every coin is moved or none is.
pub trait Custody {
    /// Transfers `coins` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` holds less than the required amount of any denomination.
    fn transfer(&mut self, from: Address, to: Address, coins: &[Coin]) -> Result<(), CustodyError>;
}

/// An in-memory [`Custody`] implementation backed by a balance map.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBank {
    balances: AHashMap<(Address, Ustr), U256>,
}

impl InMemoryBank {
    /// Creates a new empty [`InMemoryBank`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the balance of `denom` held by `address`.
    #[must_use]
    pub fn balance(&self, address: Address, denom: &str) -> U256 {
        self.balances
            .get(&(address, Ustr::from(denom)))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Credits `address` with newly issued `coin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting balance overflows.
    pub fn mint(&mut self, address: Address, coin: &Coin) -> Result<(), CustodyError> {
        let balance = self.balances.entry((address, coin.denom)).or_insert(U256::ZERO);
        *balance = balance
            .checked_add(coin.amount)
            .ok_or(CustodyError::Overflow { denom: coin.denom })?;
        Ok(())
    }
}

impl Custody for InMemoryBank {
    fn transfer(&mut self, from: Address, to: Address, coins: &[Coin]) -> Result<(), CustodyError> {
        // Repeated denoms are checked against their combined amount
        let mut required: IndexMap<Ustr, U256> = IndexMap::new();
        for coin in coins.iter().filter(|coin| !coin.amount.is_zero()) {
            let total = required.entry(coin.denom).or_insert(U256::ZERO);
            *total = total
                .checked_add(coin.amount)
                .ok_or(CustodyError::Overflow { denom: coin.denom })?;
        }

        let mut updates = Vec::with_capacity(required.len() * 2);
        for (denom, amount) in &required {
            let from_balance = self.balance(from, denom);
            let remaining =
                from_balance
                    .checked_sub(*amount)
                    .ok_or(CustodyError::InsufficientFunds {
                        denom: *denom,
                        balance: from_balance,
                        required: *amount,
                    })?;
            if from == to {
                continue;
            }
            let credited = self
                .balance(to, denom)
                .checked_add(*amount)
                .ok_or(CustodyError::Overflow { denom: *denom })?;
            updates.push(((from, *denom), remaining));
            updates.push(((to, *denom), credited));
        }

        for (key, balance) in updates {
            self.balances.insert(key, balance);
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
