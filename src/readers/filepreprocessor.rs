// src/readers/filepreprocessor.rs

//! Find the log files under a path and send each path to the file
//! processing threads of a [`WorkerPool`].
//!
//! [`WorkerPool`]: crate::readers::workerpool::WorkerPool

use crate::common::{err_from_err_path_result, FPath, FileMetadata};
use crate::debug::printers::{e_err, e_wrn};
use crate::readers::helpers::{fpath_to_path, path_to_fpath};
use crate::readers::summary::ScanSummary;

use std::io::Result;
use std::path::Path;

use ::crossbeam_channel;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Sender side of the feed of file paths (used by the scanning thread).
pub type ChanSendPath = crossbeam_channel::Sender<FPath>;
/// Receiver side of the feed of file paths (used by each file processing
/// thread).
pub type ChanRecvPath = crossbeam_channel::Receiver<FPath>;

/// Send one file path, returns `false` if every receiver is gone.
fn send_path(chan_send_path: &ChanSendPath, fpath: FPath) -> bool {
    defñ!("send_path({:?})", fpath);
    match chan_send_path.send(fpath) {
        Ok(_) => true,
        Err(err) => {
            e_err!("no file processing threads remain to receive {:?}", err.into_inner());
            false
        }
    }
}

/// Send every regular file under `root` to `chan_send_path`, recursing all
/// directories and following symlinks.
///
/// Directories are not sent. Entries that cannot be read (permissions,
/// broken symlinks, symlink loops, etc.) are printed as warnings and skipped;
/// they never stop the walk. If `root` itself cannot be read then `Err` is
/// returned and nothing is sent.
///
/// If `root` is a regular file then only `root` is sent.
///
/// The caller drops the `ChanSendPath` to signal there are no more files.
pub fn scan_path(root: &FPath, chan_send_path: &ChanSendPath) -> Result<ScanSummary> {
    defn!("({:?})", root);
    let mut summary = ScanSummary::default();

    let root_path: &Path = fpath_to_path(root);
    let metadata: FileMetadata = match std::fs::metadata(root_path) {
        Ok(val) => val,
        Err(err) => {
            defx!("metadata({:?}) Error {:?}", root_path, err);
            return err_from_err_path_result(&err, root, Some("cannot read root path"));
        }
    };
    if metadata.is_file() {
        if send_path(chan_send_path, root.clone()) {
            summary.files_found += 1;
        }
        defx!("root is a file; {:?}", summary);
        return Ok(summary);
    }

    defo!("WalkDir({:?})…", root);
    for entry in ::walkdir::WalkDir::new(root_path).follow_links(true) {
        let dir_entry = match entry {
            Ok(val) => val,
            Err(err) => {
                e_wrn!("{}", err);
                summary.entries_err += 1;
                continue;
            }
        };
        let file_type = dir_entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            defo!("not a file {:?}", dir_entry.path());
            summary.entries_not_file += 1;
            continue;
        }
        if !send_path(chan_send_path, path_to_fpath(dir_entry.path())) {
            break;
        }
        summary.files_found += 1;
    }
    defx!("{:?}", summary);

    Ok(summary)
}
