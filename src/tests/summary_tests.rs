// src/tests/summary_tests.rs

//! tests for `summary.rs`

use crate::common::FileTypeArchive;
use crate::readers::summary::{lines_per_second, FileSummary, PoolSummary, WorkerSummary};

use std::time::Duration;

use ::test_case::test_case;

#[test_case(1000, Duration::from_secs(2), 500)]
#[test_case(1000, Duration::from_millis(500), 2000)]
#[test_case(0, Duration::from_secs(1), 0; "no lines")]
#[test_case(1000, Duration::ZERO, 0; "no time")]
fn test_lines_per_second(lines: u64, elapsed: Duration, expect: u64) {
    assert_eq!(lines_per_second(lines, elapsed), expect);
}

#[test]
fn test_file_summary_display() {
    let summary = FileSummary {
        path: String::from("/var/log/dns/a.log.gz"),
        filetypearchive: FileTypeArchive::Gz,
        lines: 10,
        records_valid: 9,
        records_malformed: 1,
        keys: 2,
        elapsed: Duration::from_millis(250),
    };
    assert_eq!(summary.lines_per_second(), 40);
    assert_eq!(
        summary.to_string(),
        "/var/log/dns/a.log.gz (gz) lines 10, valid 9, malformed 1, keys 2, 0.250s, lines/s 40"
    );
}

#[test]
fn test_worker_summary_add() {
    let file_summary = FileSummary {
        lines: 5,
        records_valid: 4,
        records_malformed: 1,
        ..Default::default()
    };
    let mut worker1 = WorkerSummary::default();
    worker1.add_file(&file_summary);
    worker1.add_file(&file_summary);
    worker1.files_err += 1;
    assert_eq!(
        worker1,
        WorkerSummary {
            files_ok: 2,
            files_err: 1,
            lines: 10,
            records_valid: 8,
            records_malformed: 2,
        }
    );

    let mut total = WorkerSummary::default();
    total.add(&worker1);
    total.add(&worker1);
    assert_eq!(total.files_ok, 4);
    assert_eq!(total.files_err, 2);
    assert_eq!(total.lines, 20);
}

#[test]
fn test_pool_summary_display() {
    let mut summary = PoolSummary::default();
    let s = summary.to_string();
    assert!(s.starts_with("Files found       : 0\n"), "{}", s);
    assert!(!s.contains("panicked"), "{}", s);

    summary.workers_panicked = 1;
    let s = summary.to_string();
    assert!(s.contains("Threads panicked  : 1\n"), "{}", s);
    assert!(s.ends_with("Lines/s           : 0"), "{}", s);
}
