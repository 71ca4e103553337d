//! Writes diagnostics to the terminal.

use codespan_reporting::{
    diagnostic::{Diagnostic, Severity},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};

/// Writes the diagnostics to stderr with the severity.
pub fn emit(diagnostics: &[stepgen_dsl::diagnostic::Diagnostic], severity: Severity) {
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();
    // Diagnostics point at records and files rather than at source spans,
    // so there are no files to show excerpts from.
    let files: SimpleFiles<String, String> = SimpleFiles::new();

    for diagnostic in diagnostics {
        let diagnostic = map_diagnostic(diagnostic, severity);
        if let Err(err) = term::emit(&mut writer.lock(), &config, &files, &diagnostic) {
            eprintln!("Failed writing to terminal: {}", err);
        }
    }
}

fn map_diagnostic(
    diagnostic: &stepgen_dsl::diagnostic::Diagnostic,
    severity: Severity,
) -> Diagnostic<usize> {
    let mut notes = vec![format!(
        "{}: {}",
        diagnostic.primary.location, diagnostic.primary.message
    )];
    notes.extend(
        diagnostic
            .secondary
            .iter()
            .map(|label| format!("{}: {}", label.location, label.message)),
    );

    Diagnostic::new(severity)
        .with_code(diagnostic.code.clone())
        .with_message(diagnostic.description())
        .with_notes(notes)
}

#[cfg(test)]
mod test {
    use codespan_reporting::diagnostic::Severity;
    use stepgen_dsl::diagnostic::{Diagnostic, Label};
    use stepgen_problems::Problem;

    use super::map_diagnostic;

    #[test]
    fn map_diagnostic_when_secondary_then_note_per_label() {
        let diagnostic = Diagnostic::problem(
            Problem::ConfigDuplicateKey,
            Label::configuration("type_mapping.1", "duplicate"),
        )
        .with_secondary(Label::file("config.json", "loaded from"));

        let mapped = map_diagnostic(&diagnostic, Severity::Error);

        assert_eq!(mapped.code.as_deref(), Some("P0004"));
        assert_eq!(mapped.notes.len(), 2);
        assert!(mapped.notes[1].starts_with("config.json"));
    }
}
