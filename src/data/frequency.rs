// src/data/frequency.rs

//! Implements a [`FrequencyTable`], a raw occurrence count of client
//! addresses with no diversity math.
//!
//! [`FrequencyTable`]: crate::data::frequency::FrequencyTable

use crate::common::Count;
use crate::data::diversity::MapValueCount;
use crate::data::record::{MapKeyValues, RecordSink};

use std::sync::{Mutex, MutexGuard};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// One report entry: the count and the value.
pub type CountValue = (Count, String);
pub type CountValues = Vec<CountValue>;

/// Thread-safe count of every value (client address) over all keys.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: Mutex<MapValueCount>,
}

impl FrequencyTable {
    pub fn new() -> FrequencyTable {
        FrequencyTable::default()
    }

    fn lock(&self) -> MutexGuard<'_, MapValueCount> {
        match self.counts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of times `value` was observed.
    pub fn count_of(&self, value: &str) -> Count {
        self.lock()
            .get(value)
            .copied()
            .unwrap_or(0)
    }

    /// Count of distinct values.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Every value and its count, unordered.
    pub fn collect_counts(&self) -> CountValues {
        self.lock()
            .iter()
            .map(|(value, count)| (*count, value.clone()))
            .collect()
    }
}

impl RecordSink for FrequencyTable {
    /// Count every value of `batch` regardless of key. The table lock is
    /// taken once for the whole batch.
    fn merge_batch(&self, batch: MapKeyValues) {
        defn!("({} keys)", batch.len());
        let mut counts = self.lock();
        for values in batch.into_values() {
            for value in values.into_iter() {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        defx!("{} distinct values", counts.len());
    }
}
