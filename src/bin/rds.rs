// src/bin/rds.rs

//! Driver program _rds_ drives the [_rdslib_].
//!
//! Processes user-passed command-line arguments.
//! Then a [`WorkerPool`] scans the passed `ROOT` for files on the main
//! thread while the pool's file processing threads parse each file found.
//! Each file processing thread merges one file's records into the shared
//! [`AggregationRegistry`] (or [`FrequencyTable`] for `--mode frequency`).
//!
//! After every file processing thread is joined, a [`Reporter`] ranks the
//! keys and prints one line per key.
//!
//! If passed CLI option `--dig`, each reported address is sent one DNS query
//! before the report is written and its response code becomes a column.
//!
//! If passed CLI option `--summary`, each file's throughput is printed to
//! STDERR as it completes and one final [`PoolSummary`] is printed to
//! STDERR after the report.
//!
//! `rds.rs` should be the main thread and the only thread that prints to
//! STDOUT.
//!
//! [_rdslib_]: rdslib
//! [`WorkerPool`]: rdslib::readers::workerpool::WorkerPool
//! [`AggregationRegistry`]: rdslib::data::registry::AggregationRegistry
//! [`FrequencyTable`]: rdslib::data::frequency::FrequencyTable
//! [`Reporter`]: rdslib::printer::report::Reporter
//! [`PoolSummary`]: rdslib::readers::summary::PoolSummary

#![allow(non_camel_case_types)]

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use ::anyhow::{Context, Result};
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::rdslib::common::{Count, FPath};
use ::rdslib::data::dnscheck::{DnsChecker, PORT_DEFAULT, QNAME_DEFAULT, TIMEOUT_DEFAULT};
use ::rdslib::data::frequency::FrequencyTable;
use ::rdslib::data::iprange::IpRangeTable;
use ::rdslib::data::record::DELIMITER_DEFAULT;
use ::rdslib::data::registry::{AggregationRegistry, RankBy};
use ::rdslib::debug::printers::{e_err, e_wrn};
use ::rdslib::printer::report::{ReportSink, Reporter};
use ::rdslib::readers::summary::PoolSummary;
use ::rdslib::readers::workerpool::{workers_default, PoolConfig, WorkerPool};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ, stack::stack_offset_set};

/// CLI enum of what is aggregated per run.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Mode {
    /// Shannon diversity of client addresses per resolver
    diversity,
    /// occurrence count of each client address
    frequency,
}

/// CLI enum that maps to [`RankBy`].
///
/// [`RankBy`]: rdslib::data::registry::RankBy
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Rank_By {
    shannon,
    evenness,
}

impl From<CLI_Rank_By> for RankBy {
    fn from(val: CLI_Rank_By) -> RankBy {
        match val {
            CLI_Rank_By::shannon => RankBy::Shannon,
            CLI_Rank_By::evenness => RankBy::Evenness,
        }
    }
}

#[cfg(debug_assertions)]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "\nDEBUG BUILD";
#[cfg(not(debug_assertions))]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "";

/// `--help` _afterword_ message.
const CLI_HELP_AFTER: &str = concatcp!(
    "\
Given a directory path, all files under it are processed, recursing
directories and following symlinks. Given a file path, only that file is
processed.
The compression of each file is chosen from its file name extension:
    .gz .gzip  gzip
    .bz2       bzip2
    .xz        xz
    .lz4       lz4
    .log .txt  not compressed
Any other file name is read as gzip.

Each line is split on DELIMITER. Field 2 (zero-based) is the client address
and field 3 is the resolving server address. Lines with fewer than 4 fields
or an empty address are skipped.

The report is one line per resolving server, lowest diversity first:
    <index> <server> [<status>] [<label>]
With --mode frequency the report is one line per client address, most
frequent first:
    <count> <client> [<status>] [<label>]
<status> is the DNS response code of the address with --dig, or NORESPONSE.
<label> is the label of the --ranges range holding the address, or unknown.
",
    CLI_HELP_AFTER_NOTE_DEBUG,
);

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "rds",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(Resolver Diversity Scanner)\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Author: ", env!("CARGO_PKG_AUTHORS"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of a directory of log files, or of one log file.
    #[clap(
        required = true,
        verbatim_doc_comment,
    )]
    root: String,

    /// Count of file processing threads.
    /// Defaults to the available parallelism of the system.
    #[clap(
        short = 'j',
        long = "threads",
        verbatim_doc_comment,
        value_parser = clap::value_parser!(u16).range(1..),
    )]
    threads: Option<u16>,

    /// Count of found file paths allowed to wait for a file processing
    /// thread before the directory scan blocks.
    /// 0 is unbounded.
    #[clap(
        long = "queue-capacity",
        verbatim_doc_comment,
        default_value_t = 0,
    )]
    queue_capacity: usize,

    /// Field delimiter of log lines. May be more than one character.
    #[clap(
        short = 'd',
        long = "delimiter",
        verbatim_doc_comment,
        default_value_t = String::from(DELIMITER_DEFAULT),
    )]
    delimiter: String,

    /// What is aggregated and reported.
    #[clap(
        short = 'm',
        long = "mode",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Mode::diversity,
    )]
    mode: CLI_Mode,

    /// Diversity statistic the report is ranked by.
    /// "shannon" is the Shannon index in bits.
    /// "evenness" is the Shannon index divided by its maximum for the count
    /// of distinct clients, in [0, 1].
    #[clap(
        short = 'r',
        long = "rank-by",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Rank_By::shannon,
    )]
    rank_by: CLI_Rank_By,

    /// Write the report to this file instead of STDOUT.
    /// The file is created or truncated.
    #[clap(
        short = 'o',
        long = "output",
        verbatim_doc_comment,
    )]
    output: Option<String>,

    /// File of IP address ranges and labels, one per line,
    /// "<CIDR or start-end> <label>".
    /// Each reported address is followed by the label of the range that
    /// contains it, or "unknown".
    #[clap(
        long = "ranges",
        verbatim_doc_comment,
    )]
    ranges: Option<String>,

    /// Send one A query for DIG_NAME to each reported address and write
    /// the response code after the address.
    #[clap(
        long = "dig",
        verbatim_doc_comment,
    )]
    dig: bool,

    /// Name queried by --dig.
    #[clap(
        long = "dig-name",
        verbatim_doc_comment,
        default_value_t = String::from(QNAME_DEFAULT),
    )]
    dig_name: String,

    /// UDP port queried by --dig.
    #[clap(
        long = "dig-port",
        verbatim_doc_comment,
        default_value_t = PORT_DEFAULT,
    )]
    dig_port: u16,

    /// Milliseconds to wait for each --dig response.
    #[clap(
        long = "dig-timeout",
        verbatim_doc_comment,
        default_value_t = TIMEOUT_DEFAULT.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    dig_timeout: u64,

    /// Print a summary of each file processed and a final summary to STDERR.
    #[clap(
        short = 's',
        long = "summary",
        verbatim_doc_comment,
    )]
    summary: bool,
}

/// Options of one run, derived from the [`CLI_Args`].
#[derive(Debug)]
struct RunOptions {
    root: FPath,
    pool_config: PoolConfig,
    mode: CLI_Mode,
    rank_by: RankBy,
    report_sink: ReportSink,
    ranges: Option<FPath>,
    dig: Option<DigOptions>,
    summary: bool,
}

/// Options of `--dig`.
#[derive(Debug)]
struct DigOptions {
    qname: String,
    port: u16,
    timeout: Duration,
}

/// Process the user-passed command-line arguments.
fn cli_process_args() -> RunOptions {
    let args = CLI_Args::parse();
    defo!("args {:?}", args);

    let workers: usize = match args.threads {
        Some(val) => val as usize,
        None => workers_default(),
    };
    let queue_capacity: Option<usize> = match args.queue_capacity {
        0 => None,
        val => Some(val),
    };
    if args.delimiter.is_empty() {
        e_wrn!("--delimiter is empty; using {:?}", DELIMITER_DEFAULT);
    }
    let report_sink: ReportSink = match args.output {
        Some(fpath) => ReportSink::File(fpath),
        None => ReportSink::Stdout,
    };
    let dig: Option<DigOptions> = if args.dig {
        Some(DigOptions {
            qname: args.dig_name,
            port: args.dig_port,
            timeout: Duration::from_millis(args.dig_timeout),
        })
    } else {
        None
    };

    RunOptions {
        root: args.root,
        pool_config: PoolConfig {
            workers,
            queue_capacity,
            delimiter: args.delimiter,
            print_file_summary: args.summary,
        },
        mode: args.mode,
        rank_by: RankBy::from(args.rank_by),
        report_sink,
        ranges: args.ranges,
        dig,
        summary: args.summary,
    }
}

/// Load the `--ranges` file, if any. Lines that did not parse are warned.
fn load_ranges(ranges: &Option<FPath>) -> Result<Option<IpRangeTable>> {
    let fpath: &FPath = match ranges {
        Some(val) => val,
        None => return Ok(None),
    };
    let table = IpRangeTable::from_path(fpath)
        .with_context(|| format!("Failed to load ranges file {:?}", fpath))?;
    if table.lines_skipped != 0 {
        e_wrn!("{} lines of ranges file {:?} were not understood", table.lines_skipped, fpath);
    }
    defo!("loaded {} ranges from {:?}", table.lines_ok, fpath);

    Ok(Some(table))
}

/// Create the `DnsChecker` of `--dig`, if any, querying from `workers` threads.
fn new_checker(dig: &Option<DigOptions>, workers: usize) -> Result<Option<DnsChecker>> {
    let dig: &DigOptions = match dig {
        Some(val) => val,
        None => return Ok(None),
    };
    let checker = DnsChecker::new(&dig.qname, dig.port, dig.timeout, workers)
        .with_context(|| format!("Invalid --dig options {:?}", dig))?;

    Ok(Some(checker))
}

/// Scan, aggregate, then report.
fn run(options: RunOptions) -> Result<()> {
    defn!();
    // fail before any processing if the ranges or --dig options are bad
    let ranges: Option<IpRangeTable> = load_ranges(&options.ranges)?;
    let checker: Option<DnsChecker> = new_checker(&options.dig, options.pool_config.workers)?;
    let reporter = Reporter::new(options.report_sink, ranges).with_checker(checker);
    let pool = WorkerPool::new(options.pool_config);

    let summary: PoolSummary;
    let _lines: Count = match options.mode {
        CLI_Mode::diversity => {
            let registry = Arc::new(AggregationRegistry::new());
            summary = pool
                .run(&options.root, registry.clone())
                .context("Processing failed")?;
            reporter
                .report_diversity(&registry, options.rank_by)
                .context("Failed to write report")?
        }
        CLI_Mode::frequency => {
            let table = Arc::new(FrequencyTable::new());
            summary = pool
                .run(&options.root, table.clone())
                .context("Processing failed")?;
            reporter
                .report_frequency(&table)
                .context("Failed to write report")?
        }
    };
    defo!("reported {} lines", _lines);

    if options.summary {
        eprintln!("\nSummary:\n{}", summary);
    }
    if summary.workers_panicked != 0 {
        e_wrn!("{} file processing threads panicked; the report may be incomplete", summary.workers_panicked);
    }
    defx!();

    Ok(())
}

/// Process the user-passed command-line arguments.
/// Run the pipeline.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let options: RunOptions = cli_process_args();
    let exitcode = match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            e_err!("{:#}", err);
            ExitCode::FAILURE
        }
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use ::test_case::test_case;

    #[test]
    fn test_cli_args_debug_assert() {
        use ::clap::CommandFactory;
        CLI_Args::command().debug_assert();
    }

    #[test]
    fn test_cli_args_defaults() {
        let args = CLI_Args::try_parse_from(["rds", "/var/log/dns"]).unwrap();
        assert_eq!(args.root, "/var/log/dns");
        assert_eq!(args.threads, None);
        assert_eq!(args.queue_capacity, 0);
        assert_eq!(args.delimiter, DELIMITER_DEFAULT);
        assert_eq!(args.mode, CLI_Mode::diversity);
        assert_eq!(args.rank_by, CLI_Rank_By::shannon);
        assert_eq!(args.output, None);
        assert_eq!(args.ranges, None);
        assert!(!args.dig);
        assert_eq!(args.dig_name, QNAME_DEFAULT);
        assert_eq!(args.dig_port, 53);
        assert_eq!(args.dig_timeout, 2000);
        assert!(!args.summary);
    }

    #[test]
    fn test_cli_args_all() {
        let args = CLI_Args::try_parse_from([
            "rds", "-j", "3", "--queue-capacity", "16", "-d", ",", "-m", "frequency",
            "-r", "evenness", "-o", "out.txt", "--ranges", "ranges.txt", "--dig",
            "--dig-name", "status.example", "--dig-port", "5353", "--dig-timeout", "250", "-s", "root",
        ])
        .unwrap();
        assert_eq!(args.root, "root");
        assert_eq!(args.threads, Some(3));
        assert_eq!(args.queue_capacity, 16);
        assert_eq!(args.delimiter, ",");
        assert_eq!(args.mode, CLI_Mode::frequency);
        assert_eq!(args.rank_by, CLI_Rank_By::evenness);
        assert_eq!(args.output, Some(String::from("out.txt")));
        assert_eq!(args.ranges, Some(String::from("ranges.txt")));
        assert!(args.dig);
        assert_eq!(args.dig_name, "status.example");
        assert_eq!(args.dig_port, 5353);
        assert_eq!(args.dig_timeout, 250);
        assert!(args.summary);
    }

    #[test_case(&["rds"]; "no root")]
    #[test_case(&["rds", "-j", "0", "root"]; "zero threads")]
    #[test_case(&["rds", "-m", "median", "root"]; "bad mode")]
    #[test_case(&["rds", "-r", "simpson", "root"]; "bad rank by")]
    #[test_case(&["rds", "--dig-timeout", "0", "root"]; "zero dig timeout")]
    #[test_case(&["rds", "--dig-port", "65536", "root"]; "bad dig port")]
    fn test_cli_args_invalid(argv: &[&str]) {
        assert!(CLI_Args::try_parse_from(argv).is_err());
    }

    #[test_case(CLI_Rank_By::shannon, RankBy::Shannon)]
    #[test_case(CLI_Rank_By::evenness, RankBy::Evenness)]
    fn test_rank_by_from(cli: CLI_Rank_By, expect: RankBy) {
        assert_eq!(RankBy::from(cli), expect);
    }

    #[test]
    fn test_load_ranges_none() {
        assert!(load_ranges(&None).unwrap().is_none());
    }

    #[test]
    fn test_new_checker() {
        assert!(new_checker(&None, 4).unwrap().is_none());
        let dig = DigOptions {
            qname: String::from(QNAME_DEFAULT),
            port: PORT_DEFAULT,
            timeout: TIMEOUT_DEFAULT,
        };
        assert!(new_checker(&Some(dig), 4).unwrap().is_some());
    }

    #[test]
    fn test_new_checker_bad_name() {
        let dig = DigOptions {
            qname: format!("{}.example", "x".repeat(70)),
            port: PORT_DEFAULT,
            timeout: TIMEOUT_DEFAULT,
        };
        let err = new_checker(&Some(dig), 1).unwrap_err();
        assert!(format!("{:#}", err).contains("--dig"), "{:#}", err);
    }

    #[test]
    fn test_load_ranges_missing_file() {
        let fpath: FPath = String::from("/this/path/does/not/exist/ranges.txt");
        assert!(load_ranges(&Some(fpath)).is_err());
    }
}
