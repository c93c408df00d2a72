// src/readers/recordparser.rs

//! Parse one log file into a batch of records and merge the batch into a
//! [`RecordSink`].
//!
//! Records of a file are first gathered into a local [`MapKeyValues`] so
//! the shared aggregate is locked once per distinct key per file instead of
//! once per line.
//!
//! A file that fails to read or decompress part way through contributes
//! nothing; its partial batch is dropped.
//!
//! [`RecordSink`]: crate::data::record::RecordSink
//! [`MapKeyValues`]: crate::data::record::MapKeyValues

use crate::common::{err_from_err_path, Count, FPath, FileTypeArchive};
use crate::data::record::{batch_insert, LogRecord, MapKeyValues, RecordSink};
use crate::readers::filedecompressor::{open_decompressed, path_to_filetypearchive, BoxBufRead};
use crate::readers::helpers::fpath_to_path;
use crate::readers::summary::FileSummary;

use std::io::{BufRead, Result};
use std::time::Instant;

use ::bstr::io::BufReadExt; // provides `for_byte_line`
use ::bstr::ByteSlice; // provides `to_str_lossy`
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Counts gathered while reading one stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseCounts {
    pub lines: Count,
    pub records_valid: Count,
    pub records_malformed: Count,
}

/// Read every line of `reader`, split each on `delimiter`, and gather the
/// valid records into a batch.
///
/// Lines that are not valid UTF-8 are decoded lossily. Returns an `Err` on
/// the first read error; no partial batch is returned.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    delimiter: &str,
) -> Result<(MapKeyValues, ParseCounts)> {
    defn!("(…, {:?})", delimiter);
    let mut batch = MapKeyValues::new();
    let mut counts = ParseCounts::default();

    reader.for_byte_line(|line: &[u8]| {
        counts.lines += 1;
        let line_s = line.to_str_lossy();
        match LogRecord::from_line(&line_s, delimiter) {
            Some(record) => {
                counts.records_valid += 1;
                batch_insert(&mut batch, record);
            }
            None => {
                counts.records_malformed += 1;
            }
        }
        Ok(true)
    })?;
    defx!("{:?}, {} keys", counts, batch.len());

    Ok((batch, counts))
}

/// Decompress and parse the file at `fpath` then merge its batch into `sink`.
///
/// The compression is chosen by [`path_to_filetypearchive`].
///
/// [`path_to_filetypearchive`]: crate::readers::filedecompressor::path_to_filetypearchive
pub fn parse_file(
    fpath: &FPath,
    delimiter: &str,
    sink: &dyn RecordSink,
) -> Result<FileSummary> {
    let filetypearchive: FileTypeArchive = path_to_filetypearchive(fpath_to_path(fpath));

    parse_file_as(fpath, filetypearchive, delimiter, sink)
}

/// Like [`parse_file`] with the compression passed explicitly.
pub fn parse_file_as(
    fpath: &FPath,
    filetypearchive: FileTypeArchive,
    delimiter: &str,
    sink: &dyn RecordSink,
) -> Result<FileSummary> {
    defn!("({:?}, {:?}, {:?})", fpath, filetypearchive, delimiter);
    let start = Instant::now();

    let reader: BoxBufRead = open_decompressed(fpath, filetypearchive)?;
    let (batch, counts) = match parse_reader(reader, delimiter) {
        Ok(val) => val,
        Err(err) => {
            defx!("parse_reader Error, return {:?}", err);
            return Err(err_from_err_path(&err, fpath, Some("read failed")));
        }
    };
    let keys: Count = batch.len() as Count;
    sink.merge_batch(batch);

    let summary = FileSummary {
        path: fpath.clone(),
        filetypearchive,
        lines: counts.lines,
        records_valid: counts.records_valid,
        records_malformed: counts.records_malformed,
        keys,
        elapsed: start.elapsed(),
    };
    defx!("{}", summary);

    Ok(summary)
}
