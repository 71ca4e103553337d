//! Generates PLC step activation code.
//!
//! Activation records say which tag a step sets. The engine groups the
//! records by step, resolves the suffix of each tag from its type code and
//! renders the same plan three ways:
//!
//! * a ladder listing (`rockwell_ladder.txt`)
//! * an L5X ladder import (`rockwell_ladder.L5X`)
//! * a structured-text source (`siemens_scl.scl`)
//!
//! ```
//! use stepgen_codegen::generate;
//! use stepgen_dsl::activation::ActivationRecord;
//! use stepgen_dsl::configuration::Configuration;
//!
//! let records = vec![ActivationRecord::new(1, 3, "V101", 0, 0)];
//! let generated = generate(&records, &Configuration::default()).unwrap();
//! assert!(generated
//!     .artifacts
//!     .ladder_text
//!     .content
//!     .contains("XIC(StepFlag[3].Flag)OTL(V101.Activate)"));
//! ```

// Diagnostics are large and returned by value.
#![allow(clippy::result_large_err)]

pub mod artifact;
pub mod condition;
pub mod error;
pub mod generate;
pub mod grouper;
pub mod ladder_text;
pub mod ladder_xml;
pub mod options;
pub mod plan;
pub mod preview;
pub mod resolver;
pub mod scl;
pub mod sink;
mod writer;

pub use artifact::{Artifact, ArtifactKind, Artifacts};
pub use generate::{generate, generate_into, generate_with, Generated};
pub use options::{GenerationOptions, UnresolvedPolicy};
pub use plan::GenerationInput;
pub use preview::{preview, Preview};
pub use resolver::resolve_suffix;
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
