// src/data/record.rs

//! Implements a [`LogRecord`], the pair of fields taken from one delimited
//! DNS resolution log line, and the [`RecordSink`] trait for structures
//! that absorb the records of a whole file.
//!
//! A log line is a sequence of fields separated by a delimiter, e.g.
//!
//! ```text
//! 1717171717|example.com|192.0.2.10|198.51.100.53|A|NOERROR
//! ```
//!
//! Field index `2` is the client address (the _value_) and field index `3`
//! is the resolving server address (the _key_). Other fields are ignored.
//!
//! [`LogRecord`]: crate::data::record::LogRecord
//! [`RecordSink`]: crate::data::record::RecordSink

use std::collections::HashMap;

/// Default field delimiter of log lines.
pub const DELIMITER_DEFAULT: &str = "|";
/// Field index of the client address, the diversity _value_.
pub const FIELD_INDEX_VALUE: usize = 2;
/// Field index of the resolving server address, the diversity _key_.
pub const FIELD_INDEX_KEY: usize = 3;
/// A line must have at least this many fields to be a valid record.
pub const FIELDS_MIN: usize = 4;

// `LogRecord::from_line` reads the value field before the key field
::const_format::assertcp!(
    FIELD_INDEX_VALUE < FIELD_INDEX_KEY && FIELD_INDEX_KEY + 1 == FIELDS_MIN,
    "field indexes must be value < key < FIELDS_MIN",
);

/// Per-file batch of records: key mapped to the values seen for that key,
/// in the order the lines were read.
pub type MapKeyValues = HashMap<String, Vec<String>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LogRecord
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The value and key fields of one valid log line, borrowed from the line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LogRecord<'a> {
    /// client address
    pub value: &'a str,
    /// resolving server address
    pub key: &'a str,
}

impl<'a> LogRecord<'a> {
    /// Split `line` on `delimiter` and return the record, or `None` if the
    /// line has fewer than [`FIELDS_MIN`] fields or an empty key or value.
    ///
    /// `delimiter` must not be empty.
    pub fn from_line(line: &'a str, delimiter: &str) -> Option<LogRecord<'a>> {
        let mut fields = line.split(delimiter);
        let value: &str = fields.nth(FIELD_INDEX_VALUE)?;
        // `nth` consumed up to and including the value field
        let key: &str = fields.nth(FIELD_INDEX_KEY - FIELD_INDEX_VALUE - 1)?;
        if value.is_empty() || key.is_empty() {
            return None;
        }

        Some(LogRecord { value, key })
    }
}

/// Add `record` to the per-file `batch`.
pub fn batch_insert(batch: &mut MapKeyValues, record: LogRecord<'_>) {
    match batch.get_mut(record.key) {
        Some(values) => values.push(String::from(record.value)),
        None => {
            batch.insert(String::from(record.key), vec![String::from(record.value)]);
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RecordSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A thread-safe aggregate that absorbs the complete batch of one file.
///
/// Implementations take their locks once per distinct key of the batch (or
/// once per batch), never once per line.
pub trait RecordSink: Send + Sync {
    /// Merge all records of one file into the aggregate.
    fn merge_batch(&self, batch: MapKeyValues);
}
