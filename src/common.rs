// src/common.rs
//
// common imports, type aliases, and other globals (avoids circular imports)

use std::fmt;
use std::io::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub use std::fs::File;
pub use std::path::Path;

/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FileMetadata = std::fs::Metadata;

/// general purpose counting type
pub type Count = u64;

/// Compression applied to a log file.
///
/// Decided by file name extension, see
/// [`path_to_filetypearchive`].
///
/// [`path_to_filetypearchive`]: crate::readers::filedecompressor::path_to_filetypearchive
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FileTypeArchive {
    /// plain text, no compression
    Normal,
    /// bzip2 `.bz2`
    Bz2,
    /// gzip `.gz`, the expected format of log files
    #[default]
    Gz,
    /// lz4 frame format `.lz4`
    Lz4,
    /// xz `.xz`
    Xz,
}

impl fmt::Display for FileTypeArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            FileTypeArchive::Normal => "text",
            FileTypeArchive::Bz2 => "bz2",
            FileTypeArchive::Gz => "gz",
            FileTypeArchive::Lz4 => "lz4",
            FileTypeArchive::Xz => "xz",
        };
        write!(f, "{}", s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Create a new `Error` with the same `ErrorKind` as `error` and a message
/// that includes the file path `fpath`.
///
/// Error messages from `std::io` rarely mention the path involved, which
/// makes per-file error reports from worker threads hard to act on.
pub fn err_from_err_path(error: &Error, fpath: &FPath, mesg: Option<&str>) -> Error {
    match mesg {
        Some(mesg_) => Error::new(error.kind(), format!("{} {} for file {:?}", error, mesg_, fpath)),
        None => Error::new(error.kind(), format!("{} for file {:?}", error, fpath)),
    }
}

/// Wrapper for [`err_from_err_path`] returning a `Result::Err`.
pub fn err_from_err_path_result<T>(error: &Error, fpath: &FPath, mesg: Option<&str>) -> std::io::Result<T> {
    Err(err_from_err_path(error, fpath, mesg))
}
