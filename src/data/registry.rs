// src/data/registry.rs

//! Implements an [`AggregationRegistry`], the thread-safe mapping of key
//! (resolving server address) to its [`DiversityCalculator`].
//!
//! Locking is two-level:
//!
//! 1. the registry lock guards only the structure of the map, held just long
//!    enough to find or insert one entry
//! 2. each calculator's own lock guards its statistics
//!
//! So file processing threads updating different keys do not wait on each
//! other, and the registry lock is contended only when looking up a key.
//!
//! [`AggregationRegistry`]: crate::data::registry::AggregationRegistry
//! [`DiversityCalculator`]: crate::data::diversity::DiversityCalculator

use crate::data::diversity::DiversityCalculator;
use crate::data::record::{MapKeyValues, RecordSink};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Thread-shareable pointer to a [`DiversityCalculator`].
pub type DiversityCalculatorP = Arc<DiversityCalculator>;
type MapKeyCalculator = HashMap<String, DiversityCalculatorP>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RankBy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which diversity statistic the report is ranked by.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RankBy {
    /// raw Shannon index in bits
    #[default]
    Shannon,
    /// Shannon index normalized by its maximum, comparable across keys with
    /// different numbers of distinct values
    Evenness,
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankBy::Shannon => write!(f, "shannon"),
            RankBy::Evenness => write!(f, "evenness"),
        }
    }
}

/// One ranked report entry: the index value and the key.
pub type IndexKey = (f64, String);
pub type IndexKeys = Vec<IndexKey>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AggregationRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owner of every [`DiversityCalculator`] of a run. Entries are created on
/// first observation of a key and never removed.
#[derive(Default)]
pub struct AggregationRegistry {
    map: Mutex<MapKeyCalculator>,
}

impl fmt::Debug for AggregationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregationRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl AggregationRegistry {
    pub fn new() -> AggregationRegistry {
        AggregationRegistry::default()
    }

    /// Acquire the registry lock, recovering it if poisoned. The map is only
    /// ever inserted into so a panic elsewhere cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, MapKeyCalculator> {
        match self.map.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Return the calculator for `key`, creating an empty one if `key` has not
    /// been seen before.
    ///
    /// The registry lock is released on return; updating the returned
    /// calculator only takes the calculator's own lock.
    pub fn get_or_create(&self, key: &str) -> DiversityCalculatorP {
        let mut map = self.lock();
        match map.get(key) {
            Some(calculator) => calculator.clone(),
            None => {
                defñ!("new DiversityCalculator for key {:?}", key);
                let calculator: DiversityCalculatorP = DiversityCalculatorP::default();
                map.insert(String::from(key), calculator.clone());

                calculator
            }
        }
    }

    /// Return the calculator for `key` if it exists.
    pub fn get(&self, key: &str) -> Option<DiversityCalculatorP> {
        self.lock().get(key).cloned()
    }

    /// Count of distinct keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All keys, unordered.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .keys()
            .cloned()
            .collect()
    }

    /// Read the `rank_by` statistic of every calculator.
    ///
    /// The registry lock is held while collecting the calculator pointers,
    /// then released before any calculator lock is taken.
    pub fn collect_indices(&self, rank_by: RankBy) -> IndexKeys {
        defn!("({:?})", rank_by);
        let entries: Vec<(String, DiversityCalculatorP)> = self
            .lock()
            .iter()
            .map(|(key, calculator)| (key.clone(), calculator.clone()))
            .collect();
        let indices: IndexKeys = entries
            .into_iter()
            .map(|(key, calculator)| {
                let index: f64 = match rank_by {
                    RankBy::Shannon => calculator.shannon_index(),
                    RankBy::Evenness => calculator.evenness_index(),
                };
                (index, key)
            })
            .collect();
        defx!("return {} entries", indices.len());

        indices
    }
}

impl RecordSink for AggregationRegistry {
    /// For each key of `batch`, find or create its calculator then update
    /// it with all the values of the batch for that key.
    fn merge_batch(&self, batch: MapKeyValues) {
        defn!("({} keys)", batch.len());
        for (key, values) in batch.iter() {
            let calculator: DiversityCalculatorP = self.get_or_create(key);
            calculator.update(values);
        }
        defx!();
    }
}
