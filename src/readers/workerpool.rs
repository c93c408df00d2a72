// src/readers/workerpool.rs

//! A fixed pool of file processing threads fed file paths by one scanning
//! thread.
//!
//! ```text
//! scan_path ──FPath──▶ feed ──▶ worker-0: parse_file ─┐
//!                           ──▶ worker-1: parse_file ─┼─▶ RecordSink
//!                           ──▶ worker-N: parse_file ─┘
//! ```
//!
//! The calling thread does the scanning. When the scan completes the feed
//! sender is dropped; each worker drains the remaining paths then returns.
//! [`WorkerPool::run`] returns only after every worker thread has been
//! joined, so the `RecordSink` is complete and no longer mutated once `run`
//! returns.

use crate::common::{Count, FPath};
use crate::data::record::{RecordSink, DELIMITER_DEFAULT};
use crate::debug::printers::{e_err, e_wrn};
use crate::readers::filepreprocessor::{scan_path, ChanRecvPath, ChanSendPath};
use crate::readers::recordparser::parse_file;
use crate::readers::summary::{FileSummary, PoolSummary, ScanSummary, WorkerSummary};

use std::io::{Error, ErrorKind, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use ::crossbeam_channel;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Count of file processing threads if not configured: the available
/// parallelism of the system, or `1` if that cannot be determined.
pub fn workers_default() -> usize {
    match thread::available_parallelism() {
        Ok(val) => val.get(),
        Err(_err) => {
            defñ!("available_parallelism() Error {:?}", _err);
            1
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PoolConfig
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings of one [`WorkerPool`] run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// count of file processing threads, at least `1`
    pub workers: usize,
    /// `None` for an unbounded feed of file paths, `Some(n)` blocks the
    /// scanning thread while `n` paths are waiting
    pub queue_capacity: Option<usize>,
    /// field delimiter of log lines, never empty
    pub delimiter: String,
    /// print each file's `FileSummary` to stderr
    pub print_file_summary: bool,
}

impl Default for PoolConfig {
    fn default() -> PoolConfig {
        PoolConfig {
            workers: workers_default(),
            queue_capacity: None,
            delimiter: String::from(DELIMITER_DEFAULT),
            print_file_summary: false,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file processing thread
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Data to initialize a file processing thread.
struct ThreadInitData {
    chan_recv_path: ChanRecvPath,
    sink: Arc<dyn RecordSink>,
    delimiter: Arc<str>,
    print_file_summary: bool,
}

/// Body of one file processing thread. Receive paths until the feed is
/// closed and empty, parsing each file completely before receiving the next.
///
/// A file that fails is printed as an error and counted; the thread moves
/// on to the next path.
fn exec_fileprocessor_thread(thread_init_data: ThreadInitData) -> WorkerSummary {
    let _tname: String = String::from(thread::current().name().unwrap_or(""));
    defn!("{:?} start", _tname);
    let ThreadInitData {
        chan_recv_path,
        sink,
        delimiter,
        print_file_summary,
    } = thread_init_data;
    let mut summary = WorkerSummary::default();

    for fpath in chan_recv_path.iter() {
        defo!("{:?} recv {:?}", _tname, fpath);
        match parse_file(&fpath, &delimiter, sink.as_ref()) {
            Ok(file_summary) => {
                if print_file_summary {
                    print_file_summary_line(&file_summary);
                }
                summary.add_file(&file_summary);
            }
            Err(err) => {
                e_err!("{}", err);
                summary.files_err += 1;
            }
        }
    }
    defx!("{:?} feed closed; {:?}", _tname, summary);

    summary
}

/// Throughput diagnostic for one file, printed to stderr.
fn print_file_summary_line(file_summary: &FileSummary) {
    eprintln!("{}", file_summary);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WorkerPool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A fixed count of file processing threads draining one feed of file
/// paths into one [`RecordSink`].
#[derive(Clone, Debug)]
pub struct WorkerPool {
    config: PoolConfig,
}

impl WorkerPool {
    /// Create a `WorkerPool`. A `workers` count of `0` is raised to `1` and
    /// an empty `delimiter` is replaced with [`DELIMITER_DEFAULT`].
    pub fn new(mut config: PoolConfig) -> WorkerPool {
        if config.workers == 0 {
            e_wrn!("thread count 0 is not allowed; using 1");
            config.workers = 1;
        }
        if config.delimiter.is_empty() {
            e_wrn!("empty delimiter is not allowed; using {:?}", DELIMITER_DEFAULT);
            config.delimiter = String::from(DELIMITER_DEFAULT);
        }

        WorkerPool { config }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Process every file under `root` into `sink`.
    ///
    /// Returns after the scan is complete and all file processing threads
    /// are joined. Returns `Err` if `root` cannot be read or no file
    /// processing thread could be started; failures of individual files are
    /// only printed and counted in the returned `PoolSummary`.
    pub fn run(&self, root: &FPath, sink: Arc<dyn RecordSink>) -> Result<PoolSummary> {
        defn!("({:?}) {:?}", root, self.config);
        let start = Instant::now();

        let (chan_send_path, chan_recv_path): (ChanSendPath, ChanRecvPath) =
            match self.config.queue_capacity {
                Some(capacity) => crossbeam_channel::bounded(capacity),
                None => crossbeam_channel::unbounded(),
            };
        let delimiter: Arc<str> = Arc::from(self.config.delimiter.as_str());

        let mut handles: Vec<JoinHandle<WorkerSummary>> = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            let thread_init_data = ThreadInitData {
                chan_recv_path: chan_recv_path.clone(),
                sink: sink.clone(),
                delimiter: delimiter.clone(),
                print_file_summary: self.config.print_file_summary,
            };
            let tname: String = format!("worker-{}", worker_id);
            match thread::Builder::new()
                .name(tname.clone())
                .spawn(move || exec_fileprocessor_thread(thread_init_data))
            {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    e_err!("thread.name({:?}).spawn() failed {:?}", tname, err);
                }
            }
        }
        // only the file processing threads hold receivers
        drop(chan_recv_path);
        if handles.is_empty() {
            defx!("no threads started");
            return Err(Error::new(ErrorKind::Other, "failed to start any file processing thread"));
        }
        let worker_count: usize = handles.len();

        let scan_result: Result<ScanSummary> = scan_path(root, &chan_send_path);
        // close the feed; threads exit after draining it
        drop(chan_send_path);

        let mut workers = WorkerSummary::default();
        let mut workers_panicked: Count = 0;
        for handle in handles.into_iter() {
            let _tname: String = String::from(handle.thread().name().unwrap_or(""));
            match handle.join() {
                Ok(worker_summary) => {
                    defo!("joined {:?}; {:?}", _tname, worker_summary);
                    workers.add(&worker_summary);
                }
                Err(_err) => {
                    e_err!("file processing thread panicked");
                    workers_panicked += 1;
                }
            }
        }

        let scan: ScanSummary = scan_result?;
        let summary = PoolSummary {
            scan,
            workers,
            worker_count,
            workers_panicked,
            elapsed: start.elapsed(),
        };
        defx!("{:?}", summary);

        Ok(summary)
    }
}
