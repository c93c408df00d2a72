// src/data/mod.rs

//! The `data` module is specialized data containers for
//! [`LogRecord`]s and the aggregates built from them.
//!
//! ## Definitions of data
//!
//! ### Record
//!
//! A "record" is one line of a DNS resolution log, a sequence of fields
//! separated by a delimiter, of which two fields are used:
//!
//! * the _value_, the client address that asked for a resolution.
//! * the _key_, the resolving server address that answered.
//!
//! A "record" is represented by a [`LogRecord`].
//!
//! ### Batch
//!
//! A "batch" is all the records of one file grouped by key, a
//! [`MapKeyValues`]. A batch is merged into a shared aggregate in one step
//! through the [`RecordSink`] trait.
//!
//! ### Diversity
//!
//! The "diversity" of a key is the Shannon entropy of the distribution of
//! values observed for that key, tracked by a [`DiversityCalculator`].
//! A resolver that only ever serves a handful of clients has a low
//! diversity. All calculators of a run are owned by an
//! [`AggregationRegistry`].
//!
//! ### Frequency
//!
//! The "frequency" of a value is the count of records with that value,
//! tracked by a [`FrequencyTable`].
//!
//! ### IP range
//!
//! An [`IpRangeTable`] labels addresses by the CIDR block or address range
//! that contains them.
//!
//! ### DNS status
//!
//! A [`DnsChecker`] sends one query to each reported address and keeps the
//! response code.
//!
//! [`LogRecord`]: crate::data::record::LogRecord
//! [`MapKeyValues`]: crate::data::record::MapKeyValues
//! [`RecordSink`]: crate::data::record::RecordSink
//! [`DiversityCalculator`]: crate::data::diversity::DiversityCalculator
//! [`AggregationRegistry`]: crate::data::registry::AggregationRegistry
//! [`FrequencyTable`]: crate::data::frequency::FrequencyTable
//! [`IpRangeTable`]: crate::data::iprange::IpRangeTable
//! [`DnsChecker`]: crate::data::dnscheck::DnsChecker

pub mod diversity;
pub mod dnscheck;
pub mod frequency;
pub mod iprange;
pub mod record;
pub mod registry;
