//! The `stepgen` command line. The binary parses arguments and hands off to
//! the functions here.

// Diagnostics are large and returned by value.
#![allow(clippy::result_large_err)]

pub mod cli;
pub mod input;
pub mod logger;
pub mod report;
