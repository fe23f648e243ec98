//! Tabular value store for the Q-learning engine.

use std::collections::HashMap;

/// A discretized view of the episode used as the table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    /// Node the vehicle stands at (0 = depot)
    pub node: usize,
    /// Remaining capacity divided by the bucket size
    pub capacity_bucket: u32,
    /// Number of unserved customers divided by the bucket size
    pub remaining_bucket: usize,
    /// Position of the active vehicle in the fleet
    pub vehicle: usize,
}

/// A move available to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Drive to the customer at this node index
    Visit(usize),
    /// Drive back to the depot and close the route
    ReturnToDepot,
}

/// Builds table keys from raw episode quantities.
#[derive(Debug, Clone, Copy)]
pub struct StateEncoder {
    bucket_size: u32,
}

impl StateEncoder {
    /// A zero bucket size is treated as one.
    pub fn new(bucket_size: u32) -> Self {
        StateEncoder {
            bucket_size: bucket_size.max(1),
        }
    }

    pub fn encode(
        &self,
        node: usize,
        remaining_capacity: u32,
        remaining_customers: usize,
        vehicle: usize,
    ) -> State {
        State {
            node,
            capacity_bucket: remaining_capacity / self.bucket_size,
            remaining_bucket: remaining_customers / self.bucket_size as usize,
            vehicle,
        }
    }
}

/// Learned action values, keyed by state then action.
///
/// Entries are created lazily with value zero; reading an entry that was
/// never written also yields zero.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    values: HashMap<State, HashMap<Action, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        QTable::default()
    }

    /// Make sure every listed action has an entry for `state`.
    pub fn ensure(&mut self, state: State, actions: &[Action]) {
        let row = self.values.entry(state).or_default();
        for &action in actions {
            row.entry(action).or_insert(0.0);
        }
    }

    /// Current estimate for an action, zero when unknown.
    pub fn value(&self, state: State, action: Action) -> f64 {
        self.values
            .get(&state)
            .and_then(|row| row.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Highest estimate among `actions`; negative infinity for an empty list.
    pub fn best_value(&self, state: State, actions: &[Action]) -> f64 {
        actions
            .iter()
            .map(|&a| self.value(state, a))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// All actions whose estimate equals the maximum, in their listed order.
    pub fn best_actions(&self, state: State, actions: &[Action]) -> Vec<Action> {
        let best = self.best_value(state, actions);
        actions
            .iter()
            .copied()
            .filter(|&a| self.value(state, a) == best)
            .collect()
    }

    /// Move the estimate towards `target` by the learning rate `alpha`.
    pub fn update(&mut self, state: State, action: Action, target: f64, alpha: f64) {
        let entry = self
            .values
            .entry(state)
            .or_default()
            .entry(action)
            .or_insert(0.0);
        let old = *entry;
        *entry = old + alpha * (target - old);
    }

    /// Number of states seen so far.
    pub fn state_count(&self) -> usize {
        self.values.len()
    }

    /// Number of state/action entries.
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
