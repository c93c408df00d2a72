// src/debug/helpers.rs

//! Miscellaneous helper functions for testing: temporary files and
//! directories, and compressing test data with the same codecs the
//! [`filedecompressor`] reads.
//!
//! [`filedecompressor`]: crate::readers::filedecompressor

use crate::common::{FPath, FileTypeArchive};
use crate::readers::helpers::path_to_fpath;

use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;

use ::flate2::write::GzEncoder;
use ::flate2::Compression;
use ::lazy_static::lazy_static;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

#[doc(hidden)]
pub use ::tempfile::NamedTempFile;
#[doc(hidden)]
pub use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Temporary files and directories default to this name prefix.
pub const STR_TEMPFILE_PREFIX: &str = "tmp-rds-test-";

lazy_static! {
    pub static ref STRING_TEMPFILE_PREFIX: String = String::from(STR_TEMPFILE_PREFIX);
}

/// Small helper function for copying `NamedTempFile` path to a `FPath`.
pub fn ntf_fpath(ntf: &NamedTempFile) -> FPath {
    path_to_fpath(ntf.path())
}

/// Create a temporary directory
pub fn create_temp_dir() -> TempDir {
    defñ!();
    match ::tempfile::Builder::new()
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .tempdir()
    {
        Ok(val) => val,
        Err(err) => panic!("tempfile::Builder::new().tempdir() return Err {}", err),
    }
}

/// Testing helper function to write `data` to a temporary file ending with
/// `suffix`, e.g. `".gz"`.
pub fn create_temp_file_bytes_with_suffix(
    data: &[u8],
    suffix: &str,
) -> NamedTempFile {
    let mut ntf = match ::tempfile::Builder::new()
        .prefix::<str>(&STRING_TEMPFILE_PREFIX)
        .suffix(suffix)
        .tempfile()
    {
        Ok(val) => val,
        Err(err) => panic!("tempfile::Builder::new()..tempfile() return Err {}", err),
    };
    match ntf.write_all(data) {
        Ok(_) => {}
        Err(err) => panic!("NamedTempFile::write_all() return Err {}", err),
    }

    ntf
}

/// Testing helper function to write a `[u8]` to a file in a temporary directory.
/// Leading directories in `name` are created, e.g. `name` value `foo/bar.gz`
/// creates directory `foo` and file `bar.gz`.
pub fn create_file_bytes_name_in_tmpdir(
    data: &[u8],
    name: &str,
    tempdir: &TempDir,
) -> FPath {
    let path_file: PathBuf = tempdir.path().join(name);
    if let Some(parent) = path_file.parent() {
        if let Err(err) = create_dir_all(parent) {
            panic!("create_dir_all({:?}) Error {:?}", parent, err);
        }
    }
    defo!("File::create({:?})", path_file);
    let mut file_ = match File::create(&path_file) {
        Ok(f) => f,
        Err(err) => panic!("File::create({:?}) Error {:?}", path_file, err),
    };
    if let Err(err) = file_.write_all(data) {
        panic!("write_all({:?}) Error {:?}", path_file, err);
    }

    path_to_fpath(path_file.as_path())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// compression helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// gzip `data` as a single member
pub fn compress_gz(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::<u8>::new(), Compression::default());
    encoder.write_all(data).unwrap();

    encoder.finish().unwrap()
}

/// xz compress `data`
pub fn compress_xz(data: &[u8]) -> Vec<u8> {
    let mut input: &[u8] = data;
    let mut output: Vec<u8> = Vec::new();
    ::lzma_rs::xz_compress(&mut input, &mut output).unwrap();

    output
}

/// lz4 frame compress `data`
pub fn compress_lz4(data: &[u8]) -> Vec<u8> {
    let mut encoder = ::lz4_flex::frame::FrameEncoder::new(Vec::<u8>::new());
    encoder.write_all(data).unwrap();

    encoder.finish().unwrap()
}

/// compress `data` with the codec for `filetypearchive`.
///
/// There is no bzip2 encoder available so `Bz2` panics.
pub fn compress(data: &[u8], filetypearchive: FileTypeArchive) -> Vec<u8> {
    match filetypearchive {
        FileTypeArchive::Normal => data.to_vec(),
        FileTypeArchive::Gz => compress_gz(data),
        FileTypeArchive::Xz => compress_xz(data),
        FileTypeArchive::Lz4 => compress_lz4(data),
        FileTypeArchive::Bz2 => panic!("no bzip2 encoder available for tests"),
    }
}
