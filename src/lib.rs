// src/lib.rs

//! _rdslib_ ranks DNS resolvers by the diversity of the clients they serve.
//!
//! DNS resolution logs are delimited text files, usually gzip compressed,
//! with one resolution per line. Each line names the client address and the
//! resolving server address. For each resolving server (the _key_) the
//! Shannon entropy of its client addresses (the _values_) is tracked. A
//! resolver whose traffic comes from very few clients has low entropy and
//! is ranked first.
//!
//! See [_Overview of readers_] and [_Definitions of data_].
//!
//! [_Overview of readers_]: crate::readers
//! [_Definitions of data_]: crate::data

pub mod common;
pub mod data;
pub mod debug;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
