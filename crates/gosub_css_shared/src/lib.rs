//! Shared functionality
//!
//! This crate supplies the character stream, source locations and the error types that are
//! used by the CSS grammar crates.
//!

pub mod char_stream;
pub mod errors;
