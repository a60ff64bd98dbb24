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

//! Per-stream accounting of what each position has earned.
//!
//! A position's share is `(growth_inside - snapshot) * liquidity`. The snapshot moves forward on
//! every accrual and claim, so the same growth is never paid twice.

use std::collections::BTreeMap;

use clamm_core::ArithmeticError;

use crate::{
    accum::growth::GrowthValue, error::ClammError, identifiers::PositionKey,
    tick_map::liquidity_math::liquidity_math_add,
};

/// A position's record within one accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulatorPosition<G: GrowthValue> {
    /// Liquidity the position earns with.
    pub liquidity: u128,
    /// Growth inside the position's range at its last touch.
    pub snapshot: G,
    /// Earned value moved aside by [`Accumulator::accrue`] and not yet claimed.
    pub unclaimed: G::Owed,
}

/// A growth accumulator: a pool-wide running total plus per-position snapshots.
///
/// One instance exists per pool for the fee stream and one per incentive stream, distinguished
/// only by [`Accumulator::name`] and the growth value type.
#[derive(Clone, Debug, PartialEq)]
pub struct Accumulator<G: GrowthValue> {
    name: String,
    value: G,
    positions: BTreeMap<PositionKey, AccumulatorPosition<G>>,
}

impl<G: GrowthValue> Accumulator<G> {
    /// Creates a new empty [`Accumulator`] under the given key namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: G::default(),
            positions: BTreeMap::new(),
        }
    }

    /// Returns the key namespace of this accumulator.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the global growth.
    #[must_use]
    pub const fn value(&self) -> &G {
        &self.value
    }

    /// Returns the record of `key`, if any.
    #[must_use]
    pub fn position(&self, key: &PositionKey) -> Option<&AccumulatorPosition<G>> {
        self.positions.get(key)
    }

    /// Returns true if a record exists for `key`.
    #[must_use]
    pub fn has_position(&self, key: &PositionKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Returns the number of position records.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Increases the global growth by `amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `amount` is negative.
    /// - The global growth overflows.
    pub fn add_to_global(&mut self, amount: &G) -> Result<(), ArithmeticError> {
        if amount.is_negative() {
            return Err(ArithmeticError::NegativeValue);
        }
        self.value = self.value.checked_add(amount)?;
        Ok(())
    }

    /// Creates a zero-liquidity, zero-snapshot record for `key`.
    ///
    /// # Panics
    ///
    /// Panics if a record with nonzero liquidity already exists for `key`.
    pub fn initialize_position(&mut self, key: PositionKey) {
        if let Some(existing) = self.positions.get(&key) {
            assert!(
                existing.liquidity == 0,
                "Position {key} is already live in accumulator {} (liquidity={})",
                self.name,
                existing.liquidity
            );
        }
        self.positions.insert(
            key,
            AccumulatorPosition {
                liquidity: 0,
                snapshot: G::default(),
                unclaimed: G::Owed::default(),
            },
        );
    }

    /// Moves the value earned since the last touch into the record's unclaimed balance and
    /// advances the snapshot to `growth_inside`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No record exists for `key`.
    /// - The owed amount overflows.
    pub fn accrue(&mut self, key: &PositionKey, growth_inside: &G) -> Result<(), ClammError> {
        let name = self.name.clone();
        let position = self.position_mut(key)?;
        let earned = pending(&name, key, position, growth_inside)?;
        position.unclaimed = G::add_owed(&position.unclaimed, &earned)?;
        position.snapshot = growth_inside.clone();
        Ok(())
    }

    /// Applies `liquidity_delta` to the record and replaces its snapshot with `new_snapshot`.
    ///
    /// Callers [`Self::accrue`] first, otherwise value earned since the last touch is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if no record exists for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the new liquidity overflows or goes negative.
    pub fn update_position_liquidity(
        &mut self,
        key: &PositionKey,
        liquidity_delta: i128,
        new_snapshot: G,
    ) -> Result<(), ClammError> {
        let position = self.position_mut(key)?;
        position.liquidity = liquidity_math_add(position.liquidity, liquidity_delta);
        position.snapshot = new_snapshot;
        Ok(())
    }

    /// Returns what [`Self::claim`] would pay `key` at `growth_inside`, without claiming.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No record exists for `key`.
    /// - The owed amount overflows.
    ///
    /// # Panics
    ///
    /// Panics if `growth_inside` is below the stored snapshot.
    pub fn owed(&self, key: &PositionKey, growth_inside: &G) -> Result<G::Owed, ClammError> {
        let position = self
            .positions
            .get(key)
            .ok_or_else(|| ClammError::position_not_found(key))?;
        let earned = pending(&self.name, key, position, growth_inside)?;
        Ok(G::add_owed(&position.unclaimed, &earned)?)
    }

    /// Claims everything owed to `key`: the unclaimed balance plus the value earned since the
    /// last touch. Resets the snapshot to `growth_inside`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No record exists for `key`.
    /// - The owed amount overflows.
    ///
    /// # Panics
    ///
    /// Panics if `growth_inside` is below the stored snapshot.
    pub fn claim(&mut self, key: &PositionKey, growth_inside: &G) -> Result<G::Owed, ClammError> {
        let name = self.name.clone();
        let position = self.position_mut(key)?;
        let earned = pending(&name, key, position, growth_inside)?;
        let owed = G::add_owed(&position.unclaimed, &earned)?;
        position.unclaimed = G::Owed::default();
        position.snapshot = growth_inside.clone();
        tracing::trace!("Claimed {owed:?} for {key} from {name}");
        Ok(owed)
    }

    /// Removes the record of `key`, returning it.
    pub fn remove_position(&mut self, key: &PositionKey) -> Option<AccumulatorPosition<G>> {
        self.positions.remove(key)
    }

    fn position_mut(
        &mut self,
        key: &PositionKey,
    ) -> Result<&mut AccumulatorPosition<G>, ClammError> {
        self.positions
            .get_mut(key)
            .ok_or_else(|| ClammError::position_not_found(key))
    }
}

fn pending<G: GrowthValue>(
    name: &str,
    key: &PositionKey,
    position: &AccumulatorPosition<G>,
    growth_inside: &G,
) -> Result<G::Owed, ArithmeticError> {
    let delta = growth_inside.checked_sub(&position.snapshot)?;
    assert!(
        !delta.is_negative(),
        "Negative claim for {key} in accumulator {name}: growth inside {growth_inside:?} is below snapshot {:?}",
        position.snapshot
    );
    delta.owed_for(position.liquidity)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
