//! Loads the files a run reads: activation rows, the configuration and the
//! activation conditions.

use std::fs;
use std::path::Path;

use log::debug;
use stepgen_dsl::activation::PhaseRow;
use stepgen_dsl::condition::ConditionTable;
use stepgen_dsl::configuration::Configuration;
use stepgen_dsl::diagnostic::{Diagnostic, Label};
use stepgen_problems::Problem;

fn read(path: &Path, problem: Problem) -> Result<String, Diagnostic> {
    fs::read_to_string(path)
        .map_err(|err| Diagnostic::problem(problem, Label::file(path, err.to_string())))
}

/// Reads the rows of the phase query, keeping only the phase when one is
/// given.
pub fn read_rows(path: &Path, phase: Option<i32>) -> Result<Vec<PhaseRow>, Diagnostic> {
    let content = read(path, Problem::ActivationsRead)?;
    let rows: Vec<PhaseRow> = serde_json::from_str(&content).map_err(|err| {
        Diagnostic::problem(
            Problem::ActivationsMalformed,
            Label::file(path, err.to_string()),
        )
    })?;
    let total = rows.len();

    let rows: Vec<PhaseRow> = match phase {
        Some(phase) => rows.into_iter().filter(|row| row.phase_id == phase).collect(),
        None => rows,
    };
    debug!("Read {} of {} rows from {}", rows.len(), total, path.display());
    Ok(rows)
}

/// Reads the configuration. Without a path the built-in configuration is
/// used.
pub fn read_configuration(path: Option<&Path>) -> Result<Configuration, Diagnostic> {
    match path {
        Some(path) => {
            let content = read(path, Problem::ConfigRead)?;
            Configuration::from_json_str(&content)
                .map_err(|err| err.to_diagnostic().with_secondary(Label::file(path, "loaded from")))
        }
        None => Ok(Configuration::default()),
    }
}

/// Reads the configuration for editing. A file that does not exist yet
/// starts from the built-in configuration.
pub fn read_configuration_for_edit(path: &Path) -> Result<Configuration, Diagnostic> {
    if path.exists() {
        read_configuration(Some(path))
    } else {
        Ok(Configuration::default())
    }
}

pub fn write_configuration(path: &Path, config: &Configuration) -> Result<(), Diagnostic> {
    let write_error =
        |message: String| Diagnostic::problem(Problem::ConfigWrite, Label::file(path, message));
    let content = config
        .to_json_string()
        .map_err(|err| write_error(err.to_string()))?;
    fs::write(path, content + "\n").map_err(|err| write_error(err.to_string()))
}

pub fn read_conditions(path: Option<&Path>) -> Result<ConditionTable, Diagnostic> {
    match path {
        Some(path) => {
            let content = read(path, Problem::ConditionsRead)?;
            serde_json::from_str(&content).map_err(|err| {
                Diagnostic::problem(
                    Problem::ConditionsMalformed,
                    Label::file(path, err.to_string()),
                )
            })
        }
        None => Ok(ConditionTable::new()),
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use stepgen_problems::Problem;
    use stepgen_test::shared_resource_path;

    use super::{read_conditions, read_configuration, read_rows};

    #[test]
    fn read_rows_when_phase_then_filtered() {
        let rows = read_rows(&shared_resource_path("rows_basic.json"), Some(1002)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tag_name.as_deref(), Some("M300"));
    }

    #[test]
    fn read_rows_when_missing_file_then_read_error() {
        let err = read_rows(Path::new("does/not/exist.json"), None).unwrap_err();

        assert!(err.is(Problem::ActivationsRead));
    }

    #[test]
    fn read_rows_when_malformed_then_malformed_error() {
        let err = read_rows(&shared_resource_path("rows_malformed.json"), None).unwrap_err();

        assert!(err.is(Problem::ActivationsMalformed));
    }

    #[test]
    fn read_configuration_when_duplicate_key_then_duplicate_error() {
        let path = shared_resource_path("config_duplicate_key.json");

        let err = read_configuration(Some(&path)).unwrap_err();

        assert!(err.is(Problem::ConfigDuplicateKey));
        assert_eq!(err.secondary.len(), 1);
    }

    #[test]
    fn read_conditions_when_none_then_empty() {
        assert!(read_conditions(None).unwrap().is_empty());
    }
}
