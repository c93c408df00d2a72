// src/readers/mod.rs

//! "Readers" for _rdslib_.
//!
//! ## Overview of readers
//!
//! * [`scan_path`] walks a directory tree and sends each file path into a
//!   feed.
//! * A [`WorkerPool`] runs file processing threads that drain the feed.
//! * Each file processing thread calls [`parse_file`] for one file at a
//!   time.
//! * `parse_file` reads the file through [`open_decompressed`], gathers the
//!   file's records into one batch, then merges the batch into a
//!   [`RecordSink`].
//!
//! Statistics of each stage are gathered into the structs of [`summary`].
//!
//! [`scan_path`]: crate::readers::filepreprocessor::scan_path
//! [`WorkerPool`]: crate::readers::workerpool::WorkerPool
//! [`parse_file`]: crate::readers::recordparser::parse_file
//! [`open_decompressed`]: crate::readers::filedecompressor::open_decompressed
//! [`RecordSink`]: crate::data::record::RecordSink
//! [`summary`]: crate::readers::summary

pub mod filedecompressor;
pub mod filepreprocessor;
pub mod helpers;
pub mod recordparser;
pub mod summary;
pub mod workerpool;
