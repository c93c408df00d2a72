// src/readers/summary.rs

//! Implements `FileSummary` and `PoolSummary` statistics tracking structs.
//!
//! For CLI option `--summary`.

use crate::common::{Count, FPath, FileTypeArchive};

use std::fmt;
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileSummary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated statistics of one file processed by [`parse_file`].
///
/// [`parse_file`]: crate::readers::recordparser::parse_file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileSummary {
    /// the `FPath` of the processed file
    pub path: FPath,
    /// the compression of the processed file
    pub filetypearchive: FileTypeArchive,
    /// count of lines read
    pub lines: Count,
    /// count of lines that were valid records
    pub records_valid: Count,
    /// count of lines dropped for too few fields or an empty key or value
    pub records_malformed: Count,
    /// count of distinct keys in this file
    pub keys: Count,
    /// time spent reading, parsing, and merging this file
    pub elapsed: Duration,
}

impl FileSummary {
    /// Throughput in lines per second. `0` if no time elapsed.
    pub fn lines_per_second(&self) -> u64 {
        lines_per_second(self.lines, self.elapsed)
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) lines {}, valid {}, malformed {}, keys {}, {:.3}s, lines/s {}",
            self.path,
            self.filetypearchive,
            self.lines,
            self.records_valid,
            self.records_malformed,
            self.keys,
            self.elapsed.as_secs_f64(),
            self.lines_per_second(),
        )
    }
}

/// Helper to calculate a per-second rate.
pub fn lines_per_second(lines: Count, elapsed: Duration) -> u64 {
    let secs: f64 = elapsed.as_secs_f64();
    if secs > 0.0 {
        (lines as f64 / secs) as u64
    } else {
        0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScanSummary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Statistics of one directory traversal by [`scan_path`].
///
/// [`scan_path`]: crate::readers::filepreprocessor::scan_path
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
    /// count of regular files sent to the file processing threads
    pub files_found: Count,
    /// count of entries that could not be read (permissions, broken
    /// symlinks, symlink loops, etc.)
    pub entries_err: Count,
    /// count of entries that are not a directory and not a regular file
    pub entries_not_file: Count,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WorkerSummary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Statistics of one file processing thread.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WorkerSummary {
    pub files_ok: Count,
    pub files_err: Count,
    pub lines: Count,
    pub records_valid: Count,
    pub records_malformed: Count,
}

impl WorkerSummary {
    pub fn add_file(&mut self, file_summary: &FileSummary) {
        self.files_ok += 1;
        self.lines += file_summary.lines;
        self.records_valid += file_summary.records_valid;
        self.records_malformed += file_summary.records_malformed;
    }

    pub fn add(&mut self, other: &WorkerSummary) {
        self.files_ok += other.files_ok;
        self.files_err += other.files_err;
        self.lines += other.lines;
        self.records_valid += other.records_valid;
        self.records_malformed += other.records_malformed;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PoolSummary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Statistics of one complete run of the [`WorkerPool`].
///
/// [`WorkerPool`]: crate::readers::workerpool::WorkerPool
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolSummary {
    pub scan: ScanSummary,
    pub workers: WorkerSummary,
    /// count of file processing threads
    pub worker_count: usize,
    /// count of file processing threads that panicked
    pub workers_panicked: Count,
    pub elapsed: Duration,
}

impl PoolSummary {
    pub fn lines_per_second(&self) -> u64 {
        lines_per_second(self.workers.lines, self.elapsed)
    }
}

impl fmt::Display for PoolSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files found       : {}", self.scan.files_found)?;
        writeln!(f, "Files processed   : {}", self.workers.files_ok)?;
        writeln!(f, "Files failed      : {}", self.workers.files_err)?;
        writeln!(f, "Entries errored   : {}", self.scan.entries_err)?;
        writeln!(f, "Entries not file  : {}", self.scan.entries_not_file)?;
        writeln!(f, "Lines             : {}", self.workers.lines)?;
        writeln!(f, "Records valid     : {}", self.workers.records_valid)?;
        writeln!(f, "Records malformed : {}", self.workers.records_malformed)?;
        writeln!(f, "Threads           : {}", self.worker_count)?;
        if self.workers_panicked != 0 {
            writeln!(f, "Threads panicked  : {}", self.workers_panicked)?;
        }
        writeln!(f, "Elapsed           : {:.3}s", self.elapsed.as_secs_f64())?;
        write!(f, "Lines/s           : {}", self.lines_per_second())
    }
}
