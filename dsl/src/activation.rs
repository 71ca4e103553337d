//! Activation records and the rows they are read from.

use serde::{Deserialize, Serialize};

/// A single PLC tag that must be energized while its owning step is active.
///
/// Records are produced by whatever collaborator reads the phase tables and
/// are never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub phase_id: i32,
    pub step_no: u32,
    pub tag_name: String,
    pub i_type: i32,
    /// Only meaningful when `i_type` denotes the PID type. Zero means not-PID.
    #[serde(default)]
    pub pid_type: i32,
}

impl ActivationRecord {
    pub fn new(
        phase_id: i32,
        step_no: u32,
        tag_name: impl Into<String>,
        i_type: i32,
        pid_type: i32,
    ) -> Self {
        Self {
            phase_id,
            step_no,
            tag_name: tag_name.into(),
            i_type,
            pid_type,
        }
    }
}

/// One row as returned by the phase query: every step of the phase class,
/// joined with its activations. Steps without activations produce a single
/// row with no tag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRow {
    pub phase_id: i32,
    pub step_no: u32,
    #[serde(default)]
    pub step_name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub i_type: Option<i32>,
    #[serde(default)]
    pub pid_type: Option<i32>,
}

impl PhaseRow {
    /// Returns the activation carried by this row, if the row has one.
    ///
    /// Missing type codes read as zero, the same as a NULL column.
    pub fn activation(&self) -> Option<ActivationRecord> {
        self.tag_name.as_ref().map(|tag_name| {
            ActivationRecord::new(
                self.phase_id,
                self.step_no,
                tag_name.clone(),
                self.i_type.unwrap_or(0),
                self.pid_type.unwrap_or(0),
            )
        })
    }
}
