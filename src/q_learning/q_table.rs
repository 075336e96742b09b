//! Q-table implementation for temporal difference learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    battle::{ACTION_COUNT, Action},
    types::StateIndex,
};

/// One Q-value per action, indexed by [`Action::index`]
pub type QRow = [f64; ACTION_COUNT];

/// Sparse Q-table mapping discretized states to per-action values
///
/// Rows are created on first access through [`QTable::entry`] and start at
/// all zeros; they are never removed except by [`QTable::reset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values: state index -> value per action
    rows: HashMap<StateIndex, QRow>,
    /// Exclusive upper bound on state indices
    state_count: usize,
}

impl QTable {
    /// Create an empty Q-table accepting indices `0..state_count`
    pub fn new(state_count: usize) -> Self {
        Self {
            rows: HashMap::new(),
            state_count,
        }
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    fn check(&self, state: StateIndex) -> Result<()> {
        if state.value() >= self.state_count {
            return Err(Error::UnknownState {
                index: state.value(),
                state_count: self.state_count,
            });
        }
        Ok(())
    }

    /// Row for a visited state, `None` if never visited
    pub fn row(&self, state: StateIndex) -> Result<Option<&QRow>> {
        self.check(state)?;
        Ok(self.rows.get(&state))
    }

    /// Values for a state, all zeros if never visited (no row is created)
    pub fn values(&self, state: StateIndex) -> Result<QRow> {
        Ok(self.row(state)?.copied().unwrap_or([0.0; ACTION_COUNT]))
    }

    /// Get-or-insert-default: returns the state's row, creating an all-zero
    /// row on first access.
    pub fn entry(&mut self, state: StateIndex) -> Result<&mut QRow> {
        self.check(state)?;
        Ok(self.rows.entry(state).or_insert([0.0; ACTION_COUNT]))
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: StateIndex, action: Action) -> Result<f64> {
        Ok(self.values(state)?[action.index()])
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateIndex, action: Action, value: f64) -> Result<()> {
        self.entry(state)?[action.index()] = value;
        Ok(())
    }

    /// Maximum Q-value in a state, creating its row if missing
    pub fn max_q(&mut self, state: StateIndex) -> Result<f64> {
        Ok(self
            .entry(state)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// The next state's row is created before the max is taken, so a
    /// terminal state bootstraps from zeros unless it was visited before.
    /// Returns the updated value.
    pub fn q_learning_update(
        &mut self,
        state: StateIndex,
        action: Action,
        reward: f64,
        next_state: StateIndex,
        discount_factor: f64,
        learning_rate: f64,
    ) -> Result<f64> {
        let max_next_q = self.max_q(next_state)?;
        let td_target = reward + discount_factor * max_next_q;
        let q = &mut self.entry(state)?[action.index()];
        *q += learning_rate * (td_target - *q);
        Ok(*q)
    }

    /// Reset all Q-values (for episodic learning)
    pub fn reset(&mut self) {
        self.rows.clear();
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Visited rows ordered by state index
    pub fn sorted_rows(&self) -> Vec<(StateIndex, QRow)> {
        let mut rows: Vec<_> = self.rows.iter().map(|(state, row)| (*state, *row)).collect();
        rows.sort_by_key(|(state, _)| *state);
        rows
    }
}

/// Highest-valued action among `actions`; the first one listed wins ties
pub fn greedy_action(row: &QRow, actions: &[Action]) -> Option<Action> {
    let mut best: Option<(Action, f64)> = None;
    for &action in actions {
        let value = row[action.index()];
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((action, value)),
        }
    }
    best.map(|(action, _)| action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new(100);
        let state = StateIndex::new(42);
        assert_eq!(qtable.get(state, Action::Attack).unwrap(), 0.0);
        assert!(qtable.row(state).unwrap().is_none());
        assert!(qtable.is_empty());
    }

    #[test]
    fn test_entry_inserts_zero_row() {
        let mut qtable = QTable::new(100);
        let state = StateIndex::new(42);

        assert_eq!(*qtable.entry(state).unwrap(), [0.0, 0.0]);
        assert_eq!(qtable.len(), 1);
        assert_eq!(qtable.row(state).unwrap(), Some(&[0.0, 0.0]));
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new(100);
        let state = StateIndex::new(7);
        qtable.set(state, Action::Heal, 1.5).unwrap();
        assert_eq!(qtable.get(state, Action::Heal).unwrap(), 1.5);
        assert_eq!(qtable.get(state, Action::Attack).unwrap(), 0.0);
    }

    #[test]
    fn test_out_of_range_state_is_rejected() {
        let mut qtable = QTable::new(100);
        let state = StateIndex::new(100);
        assert!(matches!(
            qtable.entry(state),
            Err(Error::UnknownState {
                index: 100,
                state_count: 100
            })
        ));
        assert!(qtable.values(state).is_err());
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(100);
        let state = StateIndex::new(1);
        let next_state = StateIndex::new(2);
        qtable.set(next_state, Action::Attack, 0.5).unwrap();
        qtable.set(next_state, Action::Heal, 0.2).unwrap();

        let updated = qtable
            .q_learning_update(state, Action::Attack, 1.0, next_state, 0.9, 0.1)
            .unwrap();

        // Q(s,a) = 0 + 0.1 * (1 + 0.9 * 0.5 - 0) = 0.145
        assert!((updated - 0.145).abs() < 1e-12);
        assert!((qtable.get(state, Action::Attack).unwrap() - 0.145).abs() < 1e-12);
    }

    #[test]
    fn test_update_creates_next_state_row() {
        let mut qtable = QTable::new(100);
        let state = StateIndex::new(1);
        let terminal = StateIndex::new(0);

        let updated = qtable
            .q_learning_update(state, Action::Heal, -1.0, terminal, 0.9, 0.1)
            .unwrap();

        assert!((updated + 0.1).abs() < 1e-12);
        assert_eq!(qtable.row(terminal).unwrap(), Some(&[0.0, 0.0]));
        assert_eq!(qtable.len(), 2);
    }

    #[test]
    fn test_greedy_action_prefers_first_on_tie() {
        assert_eq!(
            greedy_action(&[0.3, 0.3], &Action::ALL),
            Some(Action::Attack)
        );
        assert_eq!(greedy_action(&[0.1, 0.4], &Action::ALL), Some(Action::Heal));
        assert_eq!(
            greedy_action(&[0.1, 0.4], &[Action::Attack]),
            Some(Action::Attack)
        );
        assert_eq!(greedy_action(&[0.1, 0.4], &[]), None);
    }

    #[test]
    fn test_sorted_rows() {
        let mut qtable = QTable::new(100);
        qtable.set(StateIndex::new(9), Action::Attack, 1.0).unwrap();
        qtable.set(StateIndex::new(3), Action::Heal, 2.0).unwrap();
        let rows = qtable.sorted_rows();
        assert_eq!(rows[0].0, StateIndex::new(3));
        assert_eq!(rows[1].0, StateIndex::new(9));
    }
}
