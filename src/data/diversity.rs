// src/data/diversity.rs

//! Implements a [`DiversityCalculator`], the per-key holder of client value
//! counts and the Shannon entropy statistics derived from them.
//!
//! [`DiversityCalculator`]: crate::data::diversity::DiversityCalculator

use crate::common::Count;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use ::more_asserts::debug_assert_ge;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Map of observed value (client address) to the number of times it was
/// observed.
pub type MapValueCount = HashMap<String, Count>;

/// Evenness reported when there are zero or one distinct values.
///
/// `log2(1)` is `0` and `log2(0)` is undefined so the ratio has no meaning;
/// a key that has only seen one client is "perfectly even" over that one
/// client.
pub const EVENNESS_DEGENERATE: f64 = 1.0;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DiversityState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The mutable statistics of one [`DiversityCalculator`], only ever
/// accessed under the calculator's lock.
#[derive(Debug, Default)]
struct DiversityState {
    value_counts: MapValueCount,
    total_count: Count,
    shannon_index: f64,
    max_shannon_index: f64,
}

impl DiversityState {
    /// Recompute `shannon_index` and `max_shannon_index` from the current
    /// `value_counts` and `total_count`.
    ///
    /// Every value in `value_counts` has a count of at least 1 so each
    /// proportion is greater than zero and `log2` is finite.
    fn recompute(&mut self) {
        self.shannon_index = 0.0;
        if self.value_counts.is_empty() {
            // `log2(0)` is `-inf`; keep the freshly created state
            self.max_shannon_index = 0.0;
            return;
        }
        let total: f64 = self.total_count as f64;
        for count in self.value_counts.values() {
            debug_assert_ge!(*count, 1, "zero count stored in value_counts");
            let proportion: f64 = *count as f64 / total;
            self.shannon_index -= proportion * proportion.log2();
        }
        self.max_shannon_index = (self.value_counts.len() as f64).log2();
    }

    fn evenness_index(&self) -> f64 {
        if self.value_counts.len() <= 1 {
            return EVENNESS_DEGENERATE;
        }

        self.shannon_index / self.max_shannon_index
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DiversitySnapshot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A consistent copy of the statistics of a [`DiversityCalculator`], all
/// read during one acquisition of its lock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiversitySnapshot {
    pub distinct_count: usize,
    pub total_count: Count,
    pub shannon_index: f64,
    pub max_shannon_index: f64,
    pub evenness_index: f64,
}

impl fmt::Display for DiversitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distinct {}, total {}, shannon {:.6}, max shannon {:.6}, evenness {:.6}",
            self.distinct_count,
            self.total_count,
            self.shannon_index,
            self.max_shannon_index,
            self.evenness_index,
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DiversityCalculator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tracks the values observed for one key and the Shannon diversity of
/// their distribution.
///
/// Each call to [`update`] adds a sequence of values then recomputes
/// the entropy over all distinct values from scratch. The full recompute
/// happens once per key per file (see [`MapKeyValues`]) so the cost is
/// bounded by the number of files, not the number of log lines.
///
/// All state is behind one `Mutex`; statistics can never be read in a state
/// that is inconsistent with the counts.
///
/// [`update`]: DiversityCalculator::update
/// [`MapKeyValues`]: crate::data::record::MapKeyValues
#[derive(Default)]
pub struct DiversityCalculator {
    state: Mutex<DiversityState>,
}

impl fmt::Debug for DiversityCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("DiversityCalculator")
            .field("distinct_count", &snapshot.distinct_count)
            .field("total_count", &snapshot.total_count)
            .field("shannon_index", &snapshot.shannon_index)
            .field("max_shannon_index", &snapshot.max_shannon_index)
            .finish()
    }
}

impl DiversityCalculator {
    pub fn new() -> DiversityCalculator {
        DiversityCalculator::default()
    }

    /// Acquire the state lock.
    ///
    /// A panic in another thread while holding the lock cannot leave the
    /// counts half-updated in a way that matters here (worst case one
    /// batch is partially counted) so a poisoned lock is recovered.
    fn lock(&self) -> MutexGuard<'_, DiversityState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Count each of `values` then recompute the Shannon index and maximum
    /// Shannon index.
    pub fn update<S>(&self, values: &[S])
    where
        S: AsRef<str>,
    {
        defn!("({} values)", values.len());
        let mut state = self.lock();
        for value in values.iter() {
            match state.value_counts.get_mut(value.as_ref()) {
                Some(count) => *count += 1,
                None => {
                    state.value_counts.insert(String::from(value.as_ref()), 1);
                }
            }
        }
        state.total_count += values.len() as Count;
        state.recompute();
        defx!(
            "total_count {}, shannon_index {}, max_shannon_index {}",
            state.total_count,
            state.shannon_index,
            state.max_shannon_index
        );
    }

    /// Shannon index (entropy in bits) of the observed values.
    pub fn shannon_index(&self) -> f64 {
        self.lock().shannon_index
    }

    /// `log2` of the number of distinct observed values.
    pub fn max_shannon_index(&self) -> f64 {
        self.lock().max_shannon_index
    }

    /// Shannon index divided by the maximum Shannon index, in `[0, 1]`.
    ///
    /// Returns [`EVENNESS_DEGENERATE`] if zero or one distinct values have
    /// been observed.
    pub fn evenness_index(&self) -> f64 {
        self.lock().evenness_index()
    }

    pub fn total_count(&self) -> Count {
        self.lock().total_count
    }

    pub fn distinct_count(&self) -> usize {
        self.lock().value_counts.len()
    }

    /// Number of times `value` was observed.
    pub fn count_of(&self, value: &str) -> Count {
        self.lock()
            .value_counts
            .get(value)
            .copied()
            .unwrap_or(0)
    }

    /// Copy of the value counts.
    pub fn value_counts(&self) -> MapValueCount {
        self.lock().value_counts.clone()
    }

    pub fn snapshot(&self) -> DiversitySnapshot {
        let state = self.lock();

        DiversitySnapshot {
            distinct_count: state.value_counts.len(),
            total_count: state.total_count,
            shannon_index: state.shannon_index,
            max_shannon_index: state.max_shannon_index,
            evenness_index: state.evenness_index(),
        }
    }
}
