// src/readers/filedecompressor.rs

//! The `filedecompressor` module opens a log file as a stream of
//! decompressed bytes.
//!
//! The compression format is chosen by file name extension. Files with an
//! unrecognized extension are presumed to be gzip, the format DNS resolution
//! logs are rotated into. A file that is not in the presumed format fails
//! with an `Error` on the first read.

use crate::common::{
    err_from_err_path,
    err_from_err_path_result,
    FPath,
    File,
    FileTypeArchive,
    Path,
};
use crate::readers::helpers::{fpath_to_path, path_extension_lowercase};

use std::io::{BufRead, BufReader, Cursor, Error, ErrorKind, Result};

use ::bzip2_rs::DecoderReader as Bz2DecoderReader;
// `flate2` is for gzip files.
// `MultiGzDecoder` reads all members of concatenated gzip files.
use ::flate2::read::MultiGzDecoder;
// `lz4_flex` is for lz4 files.
use ::lz4_flex::frame::FrameDecoder as Lz4FrameDecoder;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A decompressed, buffered, line-readable stream of one file.
pub type BoxBufRead = Box<dyn BufRead>;

/// Buffer size of the decompressed stream.
pub const BUFREADER_CAPACITY: usize = 65536;

/// Map a file name extension to a `FileTypeArchive`.
///
/// Extensions are compared case-insensitively.
pub fn extension_to_filetypearchive(extension: &str) -> FileTypeArchive {
    match extension {
        "gz" | "gzip" => FileTypeArchive::Gz,
        "bz2" => FileTypeArchive::Bz2,
        "xz" => FileTypeArchive::Xz,
        "lz4" => FileTypeArchive::Lz4,
        "log" | "txt" => FileTypeArchive::Normal,
        // rotated log files are commonly named like `dns.20240101` or
        // `resolver-log.1`; presume gzip
        _ => FileTypeArchive::Gz,
    }
}

/// Decide the `FileTypeArchive` of `path` by it's file name extension.
pub fn path_to_filetypearchive(path: &Path) -> FileTypeArchive {
    let filetypearchive = match path_extension_lowercase(path) {
        Some(extension) => extension_to_filetypearchive(extension.as_str()),
        None => FileTypeArchive::default(),
    };
    defñ!("({:?}) return {:?}", path, filetypearchive);

    filetypearchive
}

/// Open the file at `fpath` and wrap it in the decompressor for
/// `filetypearchive`.
///
/// Errors opening the file are returned immediately. Errors from corrupt or
/// mismatched compressed data are returned when reading the returned stream.
/// The exception is xz, which is decompressed entirely during this call (as
/// `lzma_rs` has no streaming reader) so xz data errors are returned here.
pub fn open_decompressed(
    fpath: &FPath,
    filetypearchive: FileTypeArchive,
) -> Result<BoxBufRead> {
    defn!("({:?}, {:?})", fpath, filetypearchive);
    let path_std: &Path = fpath_to_path(fpath);
    let file: File = match File::open(path_std) {
        Ok(val) => val,
        Err(err) => {
            defx!("File::open({:?}) Error, return {:?}", path_std, err);
            return err_from_err_path_result(&err, fpath, Some("open failed"));
        }
    };

    let reader: BoxBufRead = match filetypearchive {
        FileTypeArchive::Normal => {
            Box::new(BufReader::with_capacity(BUFREADER_CAPACITY, file))
        }
        FileTypeArchive::Bz2 => {
            let decoder: Bz2DecoderReader<File> = Bz2DecoderReader::new(file);
            Box::new(BufReader::with_capacity(BUFREADER_CAPACITY, decoder))
        }
        FileTypeArchive::Gz => {
            let decoder: MultiGzDecoder<File> = MultiGzDecoder::new(file);
            Box::new(BufReader::with_capacity(BUFREADER_CAPACITY, decoder))
        }
        FileTypeArchive::Lz4 => {
            let decoder: Lz4FrameDecoder<File> = Lz4FrameDecoder::new(file);
            Box::new(BufReader::with_capacity(BUFREADER_CAPACITY, decoder))
        }
        FileTypeArchive::Xz => {
            let mut bufreader: BufReader<File> = BufReader::new(file);
            let mut buffer: Vec<u8> = Vec::new();
            defo!("xz_decompress()");
            match ::lzma_rs::xz_decompress(&mut bufreader, &mut buffer) {
                Ok(_) => {}
                Err(err) => {
                    if let ::lzma_rs::error::Error::IoError(ref ioerr) = err {
                        defx!("xz_decompress IoError, return {:?}", ioerr);
                        return Err(err_from_err_path(ioerr, fpath, Some("(xz_decompress failed)")));
                    }
                    defx!("xz_decompress Error, return Err({:?})", err);
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!("xz_decompress failed: {} for file {:?}", err, fpath),
                    ));
                }
            }
            defo!("xz_decompress() complete, {} bytes", buffer.len());
            Box::new(Cursor::new(buffer))
        }
    };
    defx!("return Ok");

    Ok(reader)
}
