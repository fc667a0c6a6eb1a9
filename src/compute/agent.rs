//! Epsilon-greedy tabular Q-learning over (state, candidate) pairs.
//!
//! The Q-table lives behind a `RwLock` owned by the agent. `select` copies
//! the Q-values it needs under a short read lock and decides outside it;
//! `update` is the only writer.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::DiscoveryError;
use crate::schema::{AgentConfig, State};
use crate::store::StoreError;

/// Learned value of one (state, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QEntry {
    pub value: f64,
    /// Number of updates applied.
    pub visits: u64,
}

type QTable = BTreeMap<(State, String), QEntry>;

/// One row of a serialized Q-table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QRow {
    pub state: State,
    pub action: String,
    pub value: f64,
    pub visits: u64,
}

/// Serializable copy of the agent's learned state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTableSnapshot {
    /// Selections made so far; drives epsilon decay.
    pub selections: u64,
    pub entries: Vec<QRow>,
}

/// Q-learning selection policy.
pub struct SelectionAgent {
    config: AgentConfig,
    table: RwLock<QTable>,
    rng: Mutex<StdRng>,
    selections: AtomicU64,
    save_lock: Mutex<()>,
}

impl SelectionAgent {
    pub fn new(config: AgentConfig, seed: u64) -> Self {
        Self {
            config,
            table: RwLock::new(QTable::new()),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            selections: AtomicU64::new(0),
            save_lock: Mutex::new(()),
        }
    }

    /// Exploration rate for the next selection.
    pub fn epsilon(&self) -> f64 {
        self.epsilon_at(self.selections.load(Ordering::Relaxed))
    }

    fn epsilon_at(&self, t: u64) -> f64 {
        let decayed = self.config.initial_epsilon
            * self.config.epsilon_decay.powf(t.min(i32::MAX as u64) as f64);
        decayed.max(self.config.epsilon_floor)
    }

    /// Pick an action for `state` among `candidates`.
    ///
    /// Explores uniformly with probability epsilon, otherwise takes the
    /// highest Q-value; ties go to the earliest candidate.
    pub fn select<'c>(&self, state: State, candidates: &[&'c str]) -> Result<&'c str, DiscoveryError> {
        if candidates.is_empty() {
            return Err(DiscoveryError::InvalidInput(format!(
                "no candidates for state {state}"
            )));
        }

        let t = self.selections.fetch_add(1, Ordering::Relaxed);
        let epsilon = self.epsilon_at(t);
        let values = self.values(state, candidates);

        let (explore, random_index) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            (rng.gen_bool(epsilon), rng.gen_range(0..candidates.len()))
        };

        let index = if explore {
            random_index
        } else {
            argmax(&values)
        };
        log::debug!(
            "{state}: {} {} (epsilon {epsilon:.3})",
            if explore { "explore" } else { "exploit" },
            candidates[index]
        );
        Ok(candidates[index])
    }

    /// Q-values of `candidates` in `state`; zero for unseen pairs.
    fn values(&self, state: State, candidates: &[&str]) -> Vec<f64> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        candidates
            .iter()
            .map(|&a| table.get(&(state, a.to_string())).map_or(0.0, |e| e.value))
            .collect()
    }

    /// Apply one temporal-difference update and return the new Q-value.
    pub fn update(
        &self,
        state: State,
        action: &str,
        reward: f64,
        next_state: State,
        next_actions: &[&str],
    ) -> f64 {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);

        let next_best = next_actions
            .iter()
            .map(|&a| {
                table
                    .get(&(next_state, a.to_string()))
                    .map_or(0.0, |e| e.value)
            })
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            .unwrap_or(0.0);

        let entry = table.entry((state, action.to_string())).or_default();
        let target = reward + self.config.discount_factor * next_best;
        entry.value += self.config.learning_rate * (target - entry.value);
        entry.visits += 1;
        entry.value
    }

    /// Greedy action for `state` among actions already learned.
    pub fn best_action(&self, state: State) -> Option<String> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table
            .range((state, String::new())..)
            .take_while(|((s, _), _)| *s == state)
            .fold(None, |best: Option<(&String, f64)>, ((_, action), entry)| match best {
                Some((_, v)) if v >= entry.value => best,
                _ => Some((action, entry.value)),
            })
            .map(|(action, _)| action.clone())
    }

    pub fn q_value(&self, state: State, action: &str) -> Option<QEntry> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.get(&(state, action.to_string())).copied()
    }

    pub fn snapshot(&self) -> QTableSnapshot {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        QTableSnapshot {
            selections: self.selections.load(Ordering::Relaxed),
            entries: table
                .iter()
                .map(|((state, action), entry)| QRow {
                    state: *state,
                    action: action.clone(),
                    value: entry.value,
                    visits: entry.visits,
                })
                .collect(),
        }
    }

    /// Replace the learned state wholesale.
    pub fn restore(&self, snapshot: QTableSnapshot) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        *table = snapshot
            .entries
            .into_iter()
            .map(|row| {
                (
                    (row.state, row.action),
                    QEntry {
                        value: row.value,
                        visits: row.visits,
                    },
                )
            })
            .collect();
        self.selections.store(snapshot.selections, Ordering::Relaxed);
    }

    /// Forget everything learned and restart the epsilon schedule.
    pub fn reset_learning(&self) {
        self.restore(QTableSnapshot::default());
        log::info!("Q-table cleared");
    }

    /// Number of learned (state, action) pairs.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Save the Q-table as pretty JSON.
    ///
    /// The snapshot goes to a temporary file in the target directory that is
    /// then renamed over `path`, so readers only ever see a complete table.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Load a Q-table written by [`SelectionAgent::save`].
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<usize, StoreError> {
        let content = fs::read_to_string(path)?;
        let snapshot: QTableSnapshot = serde_json::from_str(&content)?;
        let count = snapshot.entries.len();
        self.restore(snapshot);
        Ok(count)
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
