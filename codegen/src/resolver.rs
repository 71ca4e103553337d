//! Resolves the suffix appended to an activation's tag name.

use stepgen_dsl::configuration::Configuration;

use crate::error::UnresolvedTypeError;

/// The pid type that selects the fixed output attribute of a PID loop.
pub const FIXED_OUTPUT_PID_TYPE: i32 = 4;

pub const FIXED_OUTPUT_SUFFIX: &str = ".FixedOutput";

pub const CLOSED_LOOP_SUFFIX: &str = ".ClosedLoop";

/// Returns the suffix for an activation with the type code and pid type.
///
/// The type code maps to a type name. The PID type name is special: pid
/// type 4 selects `.FixedOutput` and anything else `.ClosedLoop`, regardless
/// of the suffix mapping. Every other type name takes its suffix from the
/// suffix mapping and a type name without an entry has no suffix.
pub fn resolve_suffix(
    i_type: i32,
    pid_type: i32,
    config: &Configuration,
) -> Result<String, UnresolvedTypeError> {
    let type_name = config
        .type_name(i_type)
        .ok_or(UnresolvedTypeError { i_type })?;

    if type_name == config.pid_type_name() {
        return Ok(pid_suffix(pid_type).to_string());
    }

    Ok(config
        .suffix_rule(type_name)
        .map(|rule| rule.suffix_for(pid_type).to_string())
        .unwrap_or_default())
}

fn pid_suffix(pid_type: i32) -> &'static str {
    if pid_type == FIXED_OUTPUT_PID_TYPE {
        FIXED_OUTPUT_SUFFIX
    } else {
        CLOSED_LOOP_SUFFIX
    }
}
