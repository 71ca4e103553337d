//! A serializable summary of what a run would generate.

use serde::Serialize;
use stepgen_dsl::configuration::Configuration;
use stepgen_dsl::diagnostic::Diagnostic;

use crate::options::GenerationOptions;
use crate::plan::{self, GenerationInput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub steps: Vec<StepPreview>,
    pub total_activations: usize,
    /// Warnings rendered as text.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPreview {
    pub step_no: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub activations: Vec<ActivationPreview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationPreview {
    pub tag_name: String,
    pub type_name: String,
    pub suffix: String,
    pub target: String,
    pub pid_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_label: Option<String>,
    /// The ladder expression deciding the activation.
    pub condition: String,
}

/// Plans the input and summarizes the plan per step.
pub fn preview(
    input: &GenerationInput,
    config: &Configuration,
    options: &GenerationOptions,
) -> Result<Preview, Vec<Diagnostic>> {
    let plan = plan::build(input, config, options)?;

    let steps = plan
        .steps
        .iter()
        .map(|step| StepPreview {
            step_no: step.number,
            name: step.name.clone(),
            activations: step
                .activations
                .iter()
                .map(|activation| ActivationPreview {
                    tag_name: activation.tag_name.clone(),
                    type_name: activation.type_name.clone(),
                    suffix: activation.suffix.clone(),
                    target: activation.target(),
                    pid_type: activation.pid_type,
                    pid_label: config.pid_label(activation.pid_type).map(str::to_string),
                    condition: activation.condition.to_ladder(),
                })
                .collect(),
        })
        .collect();

    Ok(Preview {
        steps,
        total_activations: plan.activation_count(),
        warnings: plan.warnings.iter().map(|w| w.to_string()).collect(),
    })
}
