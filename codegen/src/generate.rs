//! Runs a complete generation: plan once, render three times.

use log::{info, warn};
use stepgen_dsl::activation::ActivationRecord;
use stepgen_dsl::configuration::Configuration;
use stepgen_dsl::diagnostic::Diagnostic;

use crate::artifact::Artifacts;
use crate::options::GenerationOptions;
use crate::plan::{self, GenerationInput, GenerationPlan};
use crate::sink::ArtifactSink;
use crate::{ladder_text, ladder_xml, scl};

/// The result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub artifacts: Artifacts,
    /// Problems that did not stop the run, for example skipped records.
    pub warnings: Vec<Diagnostic>,
}

/// Generates the artifacts for the records with default options.
pub fn generate(
    records: &[ActivationRecord],
    config: &Configuration,
) -> Result<Generated, Vec<Diagnostic>> {
    let input = GenerationInput::new(records.to_vec());
    generate_with(&input, config, &GenerationOptions::default())
}

/// Generates the artifacts for the input.
///
/// Either all three artifacts are returned or none of them.
pub fn generate_with(
    input: &GenerationInput,
    config: &Configuration,
    options: &GenerationOptions,
) -> Result<Generated, Vec<Diagnostic>> {
    let plan = plan::build(input, config, options)?;
    for warning in &plan.warnings {
        warn!("{}", warning);
    }

    let artifacts = render(&plan, options).map_err(|err| vec![err])?;

    info!(
        "Generated {} activations in {} steps",
        plan.activation_count(),
        plan.steps.len()
    );

    Ok(Generated {
        artifacts,
        warnings: plan.warnings,
    })
}

/// Generates the artifacts and hands them to the sink. Nothing reaches the
/// sink when generation fails.
pub fn generate_into(
    input: &GenerationInput,
    config: &Configuration,
    options: &GenerationOptions,
    sink: &mut dyn ArtifactSink,
) -> Result<Vec<Diagnostic>, Vec<Diagnostic>> {
    let generated = generate_with(input, config, options)?;
    sink.write(&generated.artifacts).map_err(|err| vec![err])?;
    Ok(generated.warnings)
}

fn render(plan: &GenerationPlan, options: &GenerationOptions) -> Result<Artifacts, Diagnostic> {
    Ok(Artifacts::new(
        ladder_text::apply(plan),
        ladder_xml::apply(plan, options)?,
        scl::apply(plan, options),
    ))
}

#[cfg(test)]
mod test {
    use stepgen_dsl::activation::ActivationRecord;
    use stepgen_dsl::configuration::Configuration;
    use stepgen_problems::Problem;

    use super::{generate, generate_into, generate_with};
    use crate::options::GenerationOptions;
    use crate::plan::GenerationInput;
    use crate::sink::MemorySink;

    #[test]
    fn generate_when_valve_then_all_artifacts_contain_target() {
        let records = vec![ActivationRecord::new(1, 1, "V101", 0, 0)];

        let generated = generate(&records, &Configuration::default()).unwrap();

        for artifact in generated.artifacts.iter() {
            assert!(artifact.content.contains("V101"));
            assert!(artifact.content.contains(".Activate"));
        }
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn generate_into_when_abort_then_sink_untouched() {
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "X", 99, 0)]);
        let mut sink = MemorySink::new();

        let errors = generate_into(
            &input,
            &Configuration::default(),
            &GenerationOptions::strict(),
            &mut sink,
        )
        .unwrap_err();

        assert!(errors[0].is(Problem::UnresolvedType));
        assert!(sink.written.is_empty());
    }

    #[test]
    fn generate_into_when_ok_then_sink_receives_same_artifacts() {
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "V101", 0, 0)]);
        let options = GenerationOptions::default();
        let mut sink = MemorySink::new();

        generate_into(&input, &Configuration::default(), &options, &mut sink).unwrap();

        let expected = generate_with(&input, &Configuration::default(), &options)
            .unwrap()
            .artifacts;
        assert_eq!(sink.last(), Some(&expected));
    }
}
