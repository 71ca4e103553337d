//! Implements the command line behavior.
//!
//! Every command reports its diagnostics to stderr and returns an error
//! message when the command failed.

use std::path::{Path, PathBuf};

use codespan_reporting::diagnostic::Severity;
use log::info;
use stepgen_codegen::{
    generate_into, preview as preview_plan, ArtifactKind, DirectorySink, GenerationInput,
    GenerationOptions,
};
use stepgen_dsl::configuration::{Configuration, SuffixRule};
use stepgen_dsl::diagnostic::Diagnostic;
use stepgen_problems::Problem;

use crate::input::{
    read_conditions, read_configuration, read_configuration_for_edit, read_rows,
    write_configuration,
};
use crate::report::emit;

/// Where a run reads its input from.
#[derive(Debug, Clone)]
pub struct Source {
    pub rows: PathBuf,
    pub config: Option<PathBuf>,
    pub conditions: Option<PathBuf>,
    pub phase: Option<i32>,
}

fn fail(diagnostics: Vec<Diagnostic>) -> String {
    emit(&diagnostics, Severity::Error);
    format!("Number of errors: {}", diagnostics.len())
}

fn load(source: &Source) -> Result<(GenerationInput, Configuration), String> {
    let rows = read_rows(&source.rows, source.phase).map_err(|e| fail(vec![e]))?;
    let config = read_configuration(source.config.as_deref()).map_err(|e| fail(vec![e]))?;
    let conditions =
        read_conditions(source.conditions.as_deref()).map_err(|e| fail(vec![e]))?;

    let input = GenerationInput::from_rows(&rows).with_conditions(conditions);
    Ok((input, config))
}

/// Generates the artifacts into the output directory.
pub fn generate(source: &Source, output: &Path, options: &GenerationOptions) -> Result<(), String> {
    let (input, config) = load(source)?;

    let mut sink = DirectorySink::new(output);
    let warnings = generate_into(&input, &config, options, &mut sink).map_err(fail)?;
    emit(&warnings, Severity::Warning);

    for kind in ArtifactKind::ALL {
        println!("{}", output.join(kind.file_name()).display());
    }
    Ok(())
}

/// Prints what a generation would produce as JSON.
pub fn preview(source: &Source, options: &GenerationOptions) -> Result<(), String> {
    let (input, config) = load(source)?;

    let preview = preview_plan(&input, &config, options).map_err(fail)?;
    let json = serde_json::to_string_pretty(&preview)
        .map_err(|e| format!("Unable to write preview. {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Prints the configuration, the built-in one when no path is given.
pub fn config_show(path: Option<&Path>) -> Result<(), String> {
    let config = read_configuration(path).map_err(|e| fail(vec![e]))?;
    let json = config
        .to_json_string()
        .map_err(|e| fail(vec![e.to_diagnostic()]))?;
    println!("{}", json);
    Ok(())
}

/// Writes the built-in configuration to the path.
pub fn config_init(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists. Use --force to replace it.",
            path.display()
        ));
    }
    write_configuration(path, &Configuration::default()).map_err(|e| fail(vec![e]))?;
    info!("Wrote configuration {}", path.display());
    println!("{}", path.display());
    Ok(())
}

/// Loads the configuration and reports whether it is valid.
pub fn config_check(path: &Path) -> Result<(), String> {
    let config = read_configuration(Some(path)).map_err(|e| fail(vec![e]))?;
    println!(
        "OK: {} type codes, {} suffix rules, {} exclusion rules",
        config.type_mapping().len(),
        config.suffix_mapping().len(),
        config.exclusions().len()
    );
    Ok(())
}

fn edit<F>(path: &Path, change: F) -> Result<(), String>
where
    F: FnOnce(Configuration) -> Configuration,
{
    let config = read_configuration_for_edit(path).map_err(|e| fail(vec![e]))?;
    write_configuration(path, &change(config)).map_err(|e| fail(vec![e]))?;
    info!("Updated configuration {}", path.display());
    Ok(())
}

pub fn config_set_type(path: &Path, i_type: i32, type_name: &str) -> Result<(), String> {
    edit(path, |config| config.with_type(i_type, type_name))
}

pub fn config_remove_type(path: &Path, i_type: i32) -> Result<(), String> {
    edit(path, |config| config.without_type(i_type))
}

pub fn config_set_suffix(path: &Path, type_name: &str, suffix: &str) -> Result<(), String> {
    edit(path, |config| {
        config.with_suffix(type_name, SuffixRule::Plain(suffix.to_string()))
    })
}

pub fn config_remove_suffix(path: &Path, type_name: &str) -> Result<(), String> {
    edit(path, |config| config.without_suffix(type_name))
}

/// Prints the message of a problem code, or of every code without one.
pub fn explain(code: Option<&str>) -> Result<(), String> {
    match code {
        Some(code) => {
            let problem =
                Problem::from_code(code).ok_or_else(|| format!("Unknown problem code '{}'", code))?;
            println!("{}: {}", problem.code(), problem.message());
        }
        None => {
            for problem in Problem::ALL {
                println!("{}: {}", problem.code(), problem.message());
            }
        }
    }
    Ok(())
}
