//! HP discretization
//!
//! Each combatant's HP range `[0, max_hp]` is split into `N` equal-width
//! bins. Only the `N - 1` internal edges separate bins, so HP at or below 0
//! lands in bucket 0 and HP at or above `max_hp` lands in bucket `N - 1`.
//! The pair of buckets is packed into one index `bucket_a + bucket_b * N`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, battle::Observation, types::StateIndex};

/// Bucket index of `hp` among `buckets` equal-width bins over `[0, max_hp]`.
///
/// Equivalent to counting the internal edges `k * max_hp / buckets`
/// (`k = 1..buckets`) that are `<= hp`, computed in integers so the result
/// never depends on floating-point rounding.
pub fn digitize(hp: i32, max_hp: i32, buckets: usize) -> usize {
    if hp <= 0 || max_hp <= 0 || buckets == 0 {
        return 0;
    }
    let scaled = i64::from(hp) * buckets as i64 / i64::from(max_hp);
    (scaled as usize).min(buckets - 1)
}

/// Number of states `N * N` for `buckets = N`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if `buckets` is zero or `N * N`
/// does not fit in `usize`.
pub fn state_count_for(buckets: usize) -> Result<usize> {
    if buckets == 0 {
        return Err(Error::InvalidConfiguration {
            message: "discretizer needs at least one bucket".to_string(),
        });
    }
    buckets
        .checked_mul(buckets)
        .ok_or_else(|| Error::InvalidConfiguration {
            message: format!("{buckets} buckets per combatant overflow the state count"),
        })
}

/// Maps both combatants' HP to a single bounded state index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiscretizer {
    buckets: usize,
    state_count: usize,
    controllable_max_hp: i32,
    opponent_max_hp: i32,
}

impl StateDiscretizer {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `buckets` is zero, its
    /// square overflows, or either max HP is not positive.
    pub fn new(buckets: usize, controllable_max_hp: i32, opponent_max_hp: i32) -> Result<Self> {
        let state_count = state_count_for(buckets)?;
        if controllable_max_hp <= 0 || opponent_max_hp <= 0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "max HP must be positive (got {controllable_max_hp} and {opponent_max_hp})"
                ),
            });
        }
        Ok(Self {
            buckets,
            state_count,
            controllable_max_hp,
            opponent_max_hp,
        })
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Number of distinct indices, `N * N`
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn controllable_bucket(&self, hp: i32) -> usize {
        digitize(hp, self.controllable_max_hp, self.buckets)
    }

    pub fn opponent_bucket(&self, hp: i32) -> usize {
        digitize(hp, self.opponent_max_hp, self.buckets)
    }

    pub fn discretize(&self, observation: Observation) -> StateIndex {
        let a = self.controllable_bucket(observation.controllable_hp);
        let b = self.opponent_bucket(observation.opponent_hp);
        StateIndex::new(a + b * self.buckets)
    }

    /// Split an index back into `(controllable_bucket, opponent_bucket)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] if the index is not below
    /// [`StateDiscretizer::state_count`].
    pub fn buckets_of(&self, state: StateIndex) -> Result<(usize, usize)> {
        if state.value() >= self.state_count() {
            return Err(Error::UnknownState {
                index: state.value(),
                state_count: self.state_count(),
            });
        }
        Ok((state.value() % self.buckets, state.value() / self.buckets))
    }
}
