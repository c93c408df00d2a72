// src/printer/report.rs

//! Rank the aggregated statistics and write the report.
//!
//! A diversity report is one line per key, least diverse first:
//!
//! ```text
//! 0.000000 198.51.100.7
//! 1.459148 198.51.100.53
//! 2.300318 203.0.113.1
//! ```
//!
//! With a [`DnsChecker`] a column holds the key's DNS response code, and with
//! an [`IpRangeTable`] a last column holds the key's label.
//!
//! A frequency report is one line per value, most frequent first:
//!
//! ```text
//! 4 192.0.2.10
//! 3 192.0.2.11
//! ```
//!
//! [`IpRangeTable`]: crate::data::iprange::IpRangeTable
//! [`DnsChecker`]: crate::data::dnscheck::DnsChecker

use crate::common::{err_from_err_path, Count, FPath, File};
use crate::data::dnscheck::{DnsChecker, DnsStatuses, NO_RESPONSE};
use crate::data::frequency::{CountValues, FrequencyTable};
use crate::data::iprange::IpRangeTable;
use crate::data::registry::{AggregationRegistry, IndexKeys, RankBy};
use crate::readers::helpers::fpath_to_path;

use std::fmt;
use std::io::{BufWriter, Result, Write};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Where the report is written.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ReportSink {
    #[default]
    Stdout,
    /// Created if missing, truncated if present.
    File(FPath),
}

impl fmt::Display for ReportSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSink::Stdout => write!(f, "STDOUT"),
            ReportSink::File(fpath) => write!(f, "{:?}", fpath),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ranking
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sort `entries` ascending by index, ties by key ascending.
pub fn rank_ascending(mut entries: IndexKeys) -> IndexKeys {
    entries.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
    });

    entries
}

/// Sort `entries` descending by count, ties by value ascending.
pub fn rank_descending(mut entries: CountValues) -> CountValues {
    entries.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
    });

    entries
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// writing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Optional columns that follow the identifier of each report line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Annotations<'a> {
    /// DNS response code of each identifier
    pub statuses: Option<&'a DnsStatuses>,
    /// label of the IP range containing each identifier
    pub ranges: Option<&'a IpRangeTable>,
}

impl Annotations<'_> {
    /// Write ` status` and ` label` for `id`, each if configured.
    fn write_columns<W: Write + ?Sized>(&self, writer: &mut W, id: &str) -> Result<()> {
        if let Some(statuses) = self.statuses {
            let status: &str = match statuses.get(id) {
                Some(val) => val.as_str(),
                None => NO_RESPONSE,
            };
            write!(writer, " {}", status)?;
        }
        if let Some(table) = self.ranges {
            write!(writer, " {}", table.label_or_unknown(id))?;
        }

        Ok(())
    }
}

/// Write one line per entry of `ranked`, `index key [status] [label]`.
pub fn write_diversity_report<W: Write + ?Sized>(
    writer: &mut W,
    ranked: &IndexKeys,
    annotations: &Annotations,
) -> Result<()> {
    for (index, key) in ranked.iter() {
        write!(writer, "{:.6} {}", index, key)?;
        annotations.write_columns(writer, key)?;
        writeln!(writer)?;
    }

    Ok(())
}

/// Write one line per entry of `ranked`, `count value [status] [label]`.
pub fn write_frequency_report<W: Write + ?Sized>(
    writer: &mut W,
    ranked: &CountValues,
    annotations: &Annotations,
) -> Result<()> {
    for (count, value) in ranked.iter() {
        write!(writer, "{} {}", count, value)?;
        annotations.write_columns(writer, value)?;
        writeln!(writer)?;
    }

    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reporter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Writes one report to a [`ReportSink`].
///
/// The `report_*` functions consume the `Reporter`; a run is reported
/// exactly once, after all file processing threads are joined.
#[derive(Debug, Default)]
pub struct Reporter {
    sink: ReportSink,
    ranges: Option<IpRangeTable>,
    checker: Option<DnsChecker>,
}

impl Reporter {
    pub fn new(sink: ReportSink, ranges: Option<IpRangeTable>) -> Reporter {
        Reporter {
            sink,
            ranges,
            checker: None,
        }
    }

    /// Query every reported identifier with `checker` before writing.
    pub fn with_checker(mut self, checker: Option<DnsChecker>) -> Reporter {
        self.checker = checker;

        self
    }

    /// Query `ids` if a `DnsChecker` is configured.
    fn dns_statuses(&self, ids: Vec<&str>) -> Option<DnsStatuses> {
        let checker: &DnsChecker = self.checker.as_ref()?;
        defo!("query {} addresses", ids.len());

        Some(checker.check_all(&ids))
    }

    /// Run `write_report` against the configured sink then flush it.
    ///
    /// Any `Err` is fatal for the caller; for a file sink the path is
    /// included in the message.
    fn with_sink<F>(&self, write_report: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        match &self.sink {
            ReportSink::Stdout => {
                let stdout = std::io::stdout();
                let mut writer = BufWriter::new(stdout.lock());
                write_report(&mut writer)?;
                writer.flush()
            }
            ReportSink::File(fpath) => {
                let file: File = File::create(fpath_to_path(fpath))
                    .map_err(|err| err_from_err_path(&err, fpath, Some("create failed")))?;
                let mut writer = BufWriter::new(file);
                write_report(&mut writer)
                    .and_then(|_| writer.flush())
                    .map_err(|err| err_from_err_path(&err, fpath, Some("write failed")))
            }
        }
    }

    /// Rank every key of `registry` by `rank_by`, least diverse first, and
    /// write them. Returns the count of lines written.
    pub fn report_diversity(self, registry: &AggregationRegistry, rank_by: RankBy) -> Result<Count> {
        defn!("({:?}) to {}", rank_by, self.sink);
        let ranked: IndexKeys = rank_ascending(registry.collect_indices(rank_by));
        let statuses: Option<DnsStatuses> =
            self.dns_statuses(ranked.iter().map(|(_, key)| key.as_str()).collect());
        let annotations = Annotations {
            statuses: statuses.as_ref(),
            ranges: self.ranges.as_ref(),
        };
        self.with_sink(|writer| write_diversity_report(writer, &ranked, &annotations))?;
        defx!("wrote {} lines", ranked.len());

        Ok(ranked.len() as Count)
    }

    /// Rank every value of `table` by count, most frequent first, and write
    /// them. Returns the count of lines written.
    pub fn report_frequency(self, table: &FrequencyTable) -> Result<Count> {
        defn!("to {}", self.sink);
        let ranked: CountValues = rank_descending(table.collect_counts());
        let statuses: Option<DnsStatuses> =
            self.dns_statuses(ranked.iter().map(|(_, value)| value.as_str()).collect());
        let annotations = Annotations {
            statuses: statuses.as_ref(),
            ranges: self.ranges.as_ref(),
        };
        self.with_sink(|writer| write_frequency_report(writer, &ranked, &annotations))?;
        defx!("wrote {} lines", ranked.len());

        Ok(ranked.len() as Count)
    }
}
