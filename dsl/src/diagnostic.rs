//! Provides definition for diagnostics, which are the errors and warnings
//! associated with generating artifacts.
//!
//! A diagnostic does not point into a source file. Instead it points at the
//! input that caused it: an activation record, a step, a configuration key
//! or a file on disk.

use std::fmt;
use std::path::PathBuf;

use stepgen_problems::Problem;

/// The input that a label refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// An activation record, identified by its position in the input
    /// sequence (0-indexed) and the values that make it recognizable.
    Record {
        index: usize,
        step_no: u32,
        tag_name: String,
    },

    /// A step of the phase sequence.
    Step(u32),

    /// A key path within the configuration, such as `type_mapping.7`.
    Configuration(String),

    /// A file on disk.
    File(PathBuf),

    /// The problem is about the run as a whole.
    Unspecified,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Record {
                index,
                step_no,
                tag_name,
            } => write!(f, "record #{} (step {}, tag '{}')", index, step_no, tag_name),
            Location::Step(step_no) => write!(f, "step {}", step_no),
            Location::Configuration(key) => write!(f, "configuration '{}'", key),
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Unspecified => write!(f, "generation"),
        }
    }
}

/// A label that refers to some input and possibly a message related to
/// that input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// The input this label refers to.
    pub location: Location,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn record(
        index: usize,
        step_no: u32,
        tag_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: Location::Record {
                index,
                step_no,
                tag_name: tag_name.into(),
            },
            message: message.into(),
        }
    }

    pub fn step(step_no: u32, message: impl Into<String>) -> Self {
        Self {
            location: Location::Step(step_no),
            message: message.into(),
        }
    }

    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Location::Configuration(key.into()),
            message: message.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            location: Location::File(path.into()),
            message: message.into(),
        }
    }

    /// A label that is about the run in its entirety rather than a
    /// particular input.
    pub fn unspecified(message: impl Into<String>) -> Self {
        Self {
            location: Location::Unspecified,
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a primary label and possibly non-zero set of secondary labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first label.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// This is similar to adding secondary labels except that this forms
    /// part of the main description and does not refer to an input.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns true if the diagnostic was created from the problem.
    pub fn is(&self, problem: Problem) -> bool {
        self.code == problem.code()
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.code,
            self.description(),
            self.primary.location,
            self.primary.message
        )?;
        for label in &self.secondary {
            write!(f, "\n  {}: {}", label.location, label.message)?;
        }
        Ok(())
    }
}
