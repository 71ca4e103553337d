//! Provides definitions of the objects that code generation consumes:
//! activation records, the suffix configuration, activation conditions,
//! and the diagnostics used to report problems with any of them.

pub mod activation;
pub mod condition;
pub mod configuration;
pub mod diagnostic;
