//! Options that shape generation but are not part of the suffix
//! configuration.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// What to do with an activation whose type code does not resolve (or
/// whose tag name is empty).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Leave the activation out of every artifact and report a warning.
    #[default]
    Skip,
    /// Fail the whole generation.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub unresolved: UnresolvedPolicy,

    /// Name of the controller in the L5X context.
    pub controller_name: String,

    /// Name of the program that owns the generated routines.
    pub program_name: String,

    /// Prefix of the per-step routine names, for example `CM_Valve_Step01`.
    pub routine_prefix: String,

    /// The step flag array read by the ladder contacts.
    pub step_flag_tag: String,

    /// The step flag structure read by the SCL conditions.
    pub scl_step_flag: String,

    /// Quote tag names in SCL assignments (`"V101".Activate`).
    pub quote_scl_tags: bool,

    /// Stamp written into the artifact headers. Never taken from the clock
    /// so that the same input always gives the same output.
    pub export_date: Option<OffsetDateTime>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Skip,
            controller_name: String::from("PhaseController"),
            program_name: String::from("Phase_SEQ"),
            routine_prefix: String::from("CM_Valve"),
            step_flag_tag: String::from("StepFlag"),
            scl_step_flag: String::from("#MyStepFlag"),
            quote_scl_tags: true,
            export_date: None,
        }
    }
}

impl GenerationOptions {
    pub fn strict() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Abort,
            ..Self::default()
        }
    }

    /// The ladder contact operand for the step, `StepFlag[3].Flag`.
    pub fn step_flag(&self, step_no: u32) -> String {
        format!("{}[{}].Flag", self.step_flag_tag, step_no)
    }

    /// The SCL operand for the step, `#MyStepFlag.Step003`.
    pub fn scl_step_member(&self, step_no: u32) -> String {
        format!("{}.Step{:03}", self.scl_step_flag, step_no)
    }
}

#[cfg(test)]
mod test {
    use super::{GenerationOptions, UnresolvedPolicy};

    #[test]
    fn step_flag_when_default_then_array_member() {
        assert_eq!(GenerationOptions::default().step_flag(7), "StepFlag[7].Flag");
    }

    #[test]
    fn scl_step_member_when_default_then_padded() {
        assert_eq!(
            GenerationOptions::default().scl_step_member(7),
            "#MyStepFlag.Step007"
        );
    }

    #[test]
    fn strict_when_created_then_abort() {
        assert_eq!(GenerationOptions::strict().unresolved, UnresolvedPolicy::Abort);
    }
}
