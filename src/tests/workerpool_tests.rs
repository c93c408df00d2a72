// src/tests/workerpool_tests.rs

//! tests for `workerpool.rs`

use crate::common::{FPath, FileTypeArchive};
use crate::data::frequency::FrequencyTable;
use crate::data::record::DELIMITER_DEFAULT;
use crate::data::registry::{AggregationRegistry, IndexKeys, RankBy};
use crate::debug::helpers::{compress, create_file_bytes_name_in_tmpdir, create_temp_dir, TempDir};
use crate::readers::helpers::path_to_fpath;
use crate::readers::summary::PoolSummary;
use crate::readers::workerpool::{workers_default, PoolConfig, WorkerPool};

use std::sync::Arc;

use ::more_asserts::assert_ge;
use ::test_case::test_case;

/// Write a tree of log files, each record of each file is key `r{file % 3}`
/// and value `10.0.{file}.{line % 5}`.
///
/// Also writes one corrupt `.gz` file that must contribute nothing.
fn create_log_tree(files: usize, lines: usize) -> TempDir {
    let tmpdir = create_temp_dir();
    for f in 0..files {
        let mut data = String::new();
        for l in 0..lines {
            data.push_str(&format!("2024|q|10.0.{}.{}|r{}|x.example\n", f, l % 5, f % 3));
        }
        data.push_str("malformed\n");
        let (filetypearchive, name) = match f % 4 {
            0 => (FileTypeArchive::Gz, format!("d{}/log{}.gz", f % 2, f)),
            1 => (FileTypeArchive::Normal, format!("d{}/sub/log{}.log", f % 2, f)),
            2 => (FileTypeArchive::Xz, format!("log{}.xz", f)),
            _ => (FileTypeArchive::Gz, format!("d{}/log.{}", f % 2, f)),
        };
        create_file_bytes_name_in_tmpdir(&compress(data.as_bytes(), filetypearchive), &name, &tmpdir);
    }
    create_file_bytes_name_in_tmpdir(b"2024|q|10.9.9.9|r0|not gzip\n", "corrupt.gz", &tmpdir);

    tmpdir
}

fn pool(workers: usize, queue_capacity: Option<usize>) -> WorkerPool {
    WorkerPool::new(PoolConfig {
        workers,
        queue_capacity,
        delimiter: String::from(DELIMITER_DEFAULT),
        print_file_summary: false,
    })
}

fn run_diversity(root: &FPath, workers: usize, queue_capacity: Option<usize>) -> (PoolSummary, IndexKeys) {
    let registry = Arc::new(AggregationRegistry::new());
    let summary = pool(workers, queue_capacity)
        .run(root, registry.clone())
        .unwrap();
    let mut indices = registry.collect_indices(RankBy::Shannon);
    indices.sort_by(|a, b| a.1.cmp(&b.1));

    (summary, indices)
}

#[test]
fn test_workers_default() {
    assert_ge!(workers_default(), 1);
}

#[test]
fn test_new_corrects_config() {
    let pool = WorkerPool::new(PoolConfig {
        workers: 0,
        queue_capacity: None,
        delimiter: String::new(),
        print_file_summary: false,
    });
    assert_eq!(pool.config().workers, 1);
    assert_eq!(pool.config().delimiter, DELIMITER_DEFAULT);
}

#[test_case(1, None; "one worker unbounded")]
#[test_case(4, None; "four workers unbounded")]
#[test_case(3, Some(1); "three workers bounded 1")]
#[test_case(16, Some(2); "more workers than files")]
#[test_case(3, Some(0); "three workers rendezvous")]
fn test_run_counts(workers: usize, queue_capacity: Option<usize>) {
    const FILES: usize = 8;
    const LINES: usize = 20;
    let tmpdir = create_log_tree(FILES, LINES);
    let (summary, indices) = run_diversity(&path_to_fpath(tmpdir.path()), workers, queue_capacity);

    assert_eq!(summary.worker_count, workers);
    assert_eq!(summary.workers_panicked, 0);
    assert_eq!(summary.scan.files_found, (FILES + 1) as u64);
    assert_eq!(summary.workers.files_ok, FILES as u64);
    assert_eq!(summary.workers.files_err, 1);
    assert_eq!(summary.workers.records_valid, (FILES * LINES) as u64);
    assert_eq!(summary.workers.records_malformed, FILES as u64);
    assert_eq!(summary.workers.lines, (FILES * (LINES + 1)) as u64);

    let keys: Vec<&str> = indices.iter().map(|(_, key)| key.as_str()).collect();
    assert_eq!(keys, vec!["r0", "r1", "r2"]);
}

/// The result does not depend on the count of file processing threads.
#[test]
fn test_run_workers_same_result() {
    let tmpdir = create_log_tree(12, 17);
    let root = path_to_fpath(tmpdir.path());
    let (_, indices1) = run_diversity(&root, 1, None);
    for workers in [2, 5, 12] {
        let (_, indices_n) = run_diversity(&root, workers, Some(3));
        assert_eq!(indices_n.len(), indices1.len());
        for (a, b) in indices1.iter().zip(indices_n.iter()) {
            assert_eq!(a.1, b.1);
            assert!((a.0 - b.0).abs() < 1e-9, "{:?} {:?}", a, b);
        }
    }
}

#[test]
fn test_run_frequency() {
    let tmpdir = create_log_tree(4, 10);
    let table = Arc::new(FrequencyTable::new());
    let summary = pool(2, None)
        .run(&path_to_fpath(tmpdir.path()), table.clone())
        .unwrap();
    assert_eq!(summary.workers.records_valid, 40);
    // 4 files, 5 distinct values each
    assert_eq!(table.len(), 20);
    assert_eq!(table.count_of("10.0.0.0"), 2);
    assert_eq!(table.count_of("10.9.9.9"), 0);
}

#[test]
fn test_run_empty_dir() {
    let tmpdir = create_temp_dir();
    let (summary, indices) = run_diversity(&path_to_fpath(tmpdir.path()), 2, None);
    assert_eq!(summary.scan.files_found, 0);
    assert_eq!(summary.workers.files_ok, 0);
    assert!(indices.is_empty());
}

#[test]
fn test_run_root_missing() {
    let registry = Arc::new(AggregationRegistry::new());
    let root: FPath = String::from("/this/path/does/not/exist/");
    assert!(pool(2, None).run(&root, registry.clone()).is_err());
    assert!(registry.is_empty());
}
