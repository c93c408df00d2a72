// src/debug/printers.rs

//! Printer macros for errors and warnings.
//!
//! Only the main thread writes to STDOUT (the report). Everything else,
//! including errors from file processing threads, is written to STDERR
//! through these macros. Each message is one write of one whole line so
//! messages from concurrent threads do not interleave.

use std::fmt;

/// One whole line of `prefix: message`.
pub fn format_line(prefix: &str, args: fmt::Arguments<'_>) -> String {
    format!("{}: {}\n", prefix, args)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `e`println! an `err`or
#[macro_export]
macro_rules! e_err {
    (
        $($args:tt)*
    ) => {
        eprint!("{}", $crate::debug::printers::format_line("ERROR", format_args!($($args)*)))
    }
}
pub use e_err;

/// `e`println! a `warn`ing
#[macro_export]
macro_rules! e_wrn {
    (
        $($args:tt)*
    ) => {
        eprint!("{}", $crate::debug::printers::format_line("WARNING", format_args!($($args)*)))
    }
}
pub use e_wrn;
