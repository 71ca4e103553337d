//! Builds the generation plan shared by every renderer.
//!
//! The plan is the single place where records are grouped, suffixes are
//! resolved and conditions are compiled. Renderers only read the plan, so
//! the three artifacts cannot disagree about which activations fire in
//! which step.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, warn};
use stepgen_dsl::activation::{ActivationRecord, PhaseRow};
use stepgen_dsl::condition::ConditionTable;
use stepgen_dsl::configuration::Configuration;
use stepgen_dsl::diagnostic::{Diagnostic, Label};
use stepgen_problems::Problem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::condition::{self, Condition};
use crate::grouper::{group_by_step, IndexedRecord};
use crate::options::{GenerationOptions, UnresolvedPolicy};
use crate::resolver::resolve_suffix;

/// Everything a generation run reads besides the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationInput {
    pub records: Vec<ActivationRecord>,

    /// Display names of steps. A named step without records still gets an
    /// (empty) block in every artifact.
    pub step_names: BTreeMap<u32, String>,

    pub conditions: ConditionTable,
}

impl GenerationInput {
    pub fn new(records: Vec<ActivationRecord>) -> Self {
        Self {
            records,
            step_names: BTreeMap::new(),
            conditions: ConditionTable::new(),
        }
    }

    /// Creates the input from phase query rows. Rows without a tag name
    /// only contribute their step name.
    pub fn from_rows(rows: &[PhaseRow]) -> Self {
        let mut input = GenerationInput::default();
        for row in rows {
            if let Some(name) = &row.step_name {
                input
                    .step_names
                    .entry(row.step_no)
                    .or_insert_with(|| name.clone());
            }
            if let Some(record) = row.activation() {
                input.records.push(record);
            }
        }
        input
    }

    pub fn with_step_name(mut self, step_no: u32, name: impl Into<String>) -> Self {
        self.step_names.insert(step_no, name.into());
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionTable) -> Self {
        self.conditions = conditions;
        self
    }
}

/// An activation with its suffix resolved and its condition compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedActivation {
    /// Position of the record in the input sequence.
    pub record_index: usize,
    pub tag_name: String,
    pub suffix: String,
    pub type_name: String,
    pub i_type: i32,
    pub pid_type: i32,
    pub condition: Condition,
    /// True when the condition came from the condition table rather than
    /// being the step flag.
    pub custom_condition: bool,
}

impl PlannedActivation {
    /// The tag with its suffix, for example `V101.Activate`.
    pub fn target(&self) -> String {
        format!("{}{}", self.tag_name, self.suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub number: u32,
    pub name: Option<String>,
    pub activations: Vec<PlannedActivation>,
}

impl PlannedStep {
    /// The step heading, `Step 03` followed by the separator and the name
    /// when the step has one.
    pub fn title(&self, separator: &str) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => {
                format!("Step {:02}{}{}", self.number, separator, name)
            }
            _ => format!("Step {:02}", self.number),
        }
    }
}

/// The export timestamp in the forms the artifacts write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// `2024-03-05 14:07:09`, used by the text listings.
    pub listing: String,
    /// `Tue Mar 05 14:07:09 2024`, used by the L5X export.
    pub export: String,
}

impl Stamp {
    fn new(date: OffsetDateTime) -> Result<Self, Diagnostic> {
        let err = |e: time::error::Format| {
            Diagnostic::problem(
                Problem::TimestampFormat,
                Label::unspecified(e.to_string()),
            )
        };
        Ok(Stamp {
            listing: date
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second]"
                ))
                .map_err(err)?,
            export: date
                .format(format_description!(
                    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [year]"
                ))
                .map_err(err)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    /// Steps in ascending order.
    pub steps: Vec<PlannedStep>,
    pub stamp: Option<Stamp>,
    /// Problems that did not stop generation.
    pub warnings: Vec<Diagnostic>,
}

impl GenerationPlan {
    /// Number of activations across all steps.
    pub fn activation_count(&self) -> usize {
        self.steps.iter().map(|step| step.activations.len()).sum()
    }
}

/// Builds the plan for the input.
///
/// Returns `Err` with every problem found when the unresolved policy is to
/// abort and a record does not resolve, or when a condition does not
/// compile. Otherwise problems are returned as warnings in the plan.
pub fn build(
    input: &GenerationInput,
    config: &Configuration,
    options: &GenerationOptions,
) -> Result<GenerationPlan, Vec<Diagnostic>> {
    let mut warnings = vec![];
    let mut errors = vec![];

    if input.records.is_empty() {
        warnings.push(Diagnostic::problem(
            Problem::EmptyInput,
            Label::unspecified("the input has no activation records"),
        ));
    }

    let grouped = group_by_step(&input.records);
    let step_numbers: BTreeSet<u32> = grouped
        .step_numbers()
        .chain(input.step_names.keys().copied())
        .collect();

    let mut used_conditions: HashSet<(u32, String)> = HashSet::new();
    let mut steps = Vec::with_capacity(step_numbers.len());

    for step_no in step_numbers {
        let mut activations = vec![];
        for indexed in grouped.get(step_no).unwrap_or_default() {
            // Exclusions are intentional, so they are warnings under every policy.
            if let Some(rule) =
                config.exclusion_for(indexed.record.i_type, indexed.record.pid_type)
            {
                debug!(
                    "Excluding {} in step {} by rule {}",
                    indexed.record.tag_name, step_no, rule
                );
                warnings.push(
                    Diagnostic::problem(
                        Problem::ActivationExcluded,
                        record_label(indexed, "excluded by configuration"),
                    )
                    .with_context("rule", &rule.to_string()),
                );
                continue;
            }

            let mut activation = match plan_activation(indexed, config, options) {
                Ok(activation) => activation,
                Err(diagnostic) => {
                    match options.unresolved {
                        UnresolvedPolicy::Skip => {
                            warn!("Skipping activation: {}", diagnostic);
                            warnings.push(diagnostic);
                        }
                        UnresolvedPolicy::Abort => errors.push(diagnostic),
                    }
                    continue;
                }
            };

            let target = activation.target();
            if let Some(custom) = input.conditions.get(step_no, &target) {
                used_conditions.insert((step_no, target.clone()));
                if !custom.is_empty() {
                    match condition::compile(custom, step_no, &target) {
                        Ok(compiled) => {
                            activation.condition = compiled;
                            activation.custom_condition = true;
                        }
                        Err(err) => errors.push(err),
                    }
                }
            }
            activations.push(activation);
        }

        debug!("Planned step {} with {} activations", step_no, activations.len());
        steps.push(PlannedStep {
            number: step_no,
            name: input.step_names.get(&step_no).cloned(),
            activations,
        });
    }

    for (step_no, target, custom) in input.conditions.iter() {
        if !custom.is_empty() && !used_conditions.contains(&(step_no, target.to_string())) {
            warnings.push(Diagnostic::problem(
                Problem::ConditionUnused,
                Label::step(step_no, format!("no activation '{}' in the step", target)),
            ));
        }
    }

    let stamp = match options.export_date {
        Some(date) => match Stamp::new(date) {
            Ok(stamp) => Some(stamp),
            Err(err) => {
                errors.push(err);
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(GenerationPlan {
        steps,
        stamp,
        warnings,
    })
}

fn record_label(indexed: &IndexedRecord, message: impl Into<String>) -> Label {
    Label::record(
        indexed.index,
        indexed.record.step_no,
        indexed.record.tag_name.clone(),
        message,
    )
}

fn plan_activation(
    indexed: &IndexedRecord,
    config: &Configuration,
    options: &GenerationOptions,
) -> Result<PlannedActivation, Diagnostic> {
    let record = indexed.record;

    if record.tag_name.trim().is_empty() {
        return Err(Diagnostic::problem(
            Problem::EmptyTagName,
            record_label(indexed, "the tag name is empty"),
        ));
    }
    if record.tag_name.chars().any(char::is_control) {
        return Err(Diagnostic::problem(
            Problem::InvalidTagName,
            record_label(indexed, "the tag name contains a control character"),
        ));
    }

    let suffix = resolve_suffix(record.i_type, record.pid_type, config).map_err(|err| {
        Diagnostic::problem(Problem::UnresolvedType, record_label(indexed, err.to_string()))
            .with_context("i_type", &record.i_type.to_string())
    })?;

    Ok(PlannedActivation {
        record_index: indexed.index,
        tag_name: record.tag_name.clone(),
        suffix,
        type_name: config
            .type_name(record.i_type)
            .unwrap_or_default()
            .to_string(),
        i_type: record.i_type,
        pid_type: record.pid_type,
        condition: Condition::step_flag(record.step_no, options),
        custom_condition: false,
    })
}

#[cfg(test)]
mod test {
    use stepgen_dsl::activation::{ActivationRecord, PhaseRow};
    use stepgen_dsl::condition::{ActivationCondition, ConditionOperand, ConditionTable};
    use stepgen_dsl::configuration::{Configuration, ExclusionRule};
    use stepgen_problems::Problem;
    use time::macros::datetime;

    use super::{build, GenerationInput};
    use crate::options::GenerationOptions;

    fn config() -> Configuration {
        Configuration::empty()
            .with_type(0, "Valve")
            .with_suffix("Valve", ".Activate")
    }

    #[test]
    fn build_when_empty_input_then_warning_and_no_steps() {
        let plan = build(&GenerationInput::default(), &config(), &GenerationOptions::default())
            .unwrap();

        assert!(plan.steps.is_empty());
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].is(Problem::EmptyInput));
    }

    #[test]
    fn build_when_unresolved_and_skip_then_warning_and_record_dropped() {
        let input = GenerationInput::new(vec![
            ActivationRecord::new(1, 1, "V101", 0, 0),
            ActivationRecord::new(1, 1, "X999", 42, 0),
        ]);

        let plan = build(&input, &config(), &GenerationOptions::default()).unwrap();

        assert_eq!(plan.activation_count(), 1);
        assert_eq!(plan.steps[0].activations[0].target(), "V101.Activate");
        assert!(plan.warnings[0].is(Problem::UnresolvedType));
    }

    #[test]
    fn build_when_unresolved_and_abort_then_err_lists_every_record() {
        let input = GenerationInput::new(vec![
            ActivationRecord::new(1, 1, "A", 41, 0),
            ActivationRecord::new(1, 2, "B", 0, 0),
            ActivationRecord::new(1, 3, "C", 42, 0),
        ]);

        let errors = build(&input, &config(), &GenerationOptions::strict()).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.is(Problem::UnresolvedType)));
    }

    #[test]
    fn build_when_empty_tag_then_handled_like_unresolved() {
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, " ", 0, 0)]);

        let plan = build(&input, &config(), &GenerationOptions::default()).unwrap();
        assert_eq!(plan.activation_count(), 0);
        assert!(plan.warnings[0].is(Problem::EmptyTagName));

        let errors = build(&input, &config(), &GenerationOptions::strict()).unwrap_err();
        assert!(errors[0].is(Problem::EmptyTagName));
    }

    #[test]
    fn build_when_tag_has_control_character_then_handled_like_unresolved() {
        let input = GenerationInput::new(vec![
            ActivationRecord::new(1, 1, "V\u{1}01", 0, 0),
            ActivationRecord::new(1, 1, "V1\nXIC(StepFlag[9].Flag)OTL(X", 0, 0),
            ActivationRecord::new(1, 1, "V102", 0, 0),
        ]);

        let plan = build(&input, &config(), &GenerationOptions::default()).unwrap();
        assert_eq!(plan.activation_count(), 1);
        assert_eq!(plan.warnings.len(), 2);
        assert!(plan.warnings.iter().all(|w| w.is(Problem::InvalidTagName)));

        let errors = build(&input, &config(), &GenerationOptions::strict()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.is(Problem::InvalidTagName)));
    }

    #[test]
    fn build_when_excluded_then_warning_even_when_strict() {
        let config = config().with_exclusion(ExclusionRule {
            pid_type: 3,
            only: None,
            except: vec![],
        });
        let input = GenerationInput::new(vec![
            ActivationRecord::new(1, 1, "V101", 0, 3),
            ActivationRecord::new(1, 1, "V102", 0, 0),
        ]);

        let plan = build(&input, &config, &GenerationOptions::strict()).unwrap();

        assert_eq!(plan.activation_count(), 1);
        assert_eq!(plan.steps[0].activations[0].tag_name, "V102");
        assert!(plan.warnings[0].is(Problem::ActivationExcluded));
    }

    #[test]
    fn build_when_named_step_without_records_then_empty_step() {
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 2, "V101", 0, 0)])
            .with_step_name(1, "Idle")
            .with_step_name(2, "Fill");

        let plan = build(&input, &config(), &GenerationOptions::default()).unwrap();

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].title(" -- "), "Step 01 -- Idle");
        assert!(plan.steps[0].activations.is_empty());
        assert_eq!(plan.steps[1].activations.len(), 1);
    }

    #[test]
    fn build_when_condition_matches_then_custom_condition() {
        let conditions = ConditionTable::new().with_condition(
            1,
            "V101.Activate",
            ActivationCondition::new(
                "X1 AND X2",
                vec![
                    ConditionOperand::new("X1", "StepFlag[1].Flag", false),
                    ConditionOperand::new("X2", "Permissive", false),
                ],
            ),
        );
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "V101", 0, 0)])
            .with_conditions(conditions);

        let plan = build(&input, &config(), &GenerationOptions::default()).unwrap();

        let activation = &plan.steps[0].activations[0];
        assert!(activation.custom_condition);
        assert_eq!(
            activation.condition.to_ladder(),
            "XIC(StepFlag[1].Flag)XIC(Permissive)"
        );
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn build_when_condition_has_no_activation_then_unused_warning() {
        let conditions = ConditionTable::new().with_condition(
            4,
            "V101.Activate",
            ActivationCondition::new("X1", vec![ConditionOperand::new("X1", "A", false)]),
        );
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "V101", 0, 0)])
            .with_conditions(conditions);

        let plan = build(&input, &config(), &GenerationOptions::default()).unwrap();

        assert!(plan.warnings[0].is(Problem::ConditionUnused));
    }

    #[test]
    fn build_when_condition_invalid_then_err_even_when_skip() {
        let conditions = ConditionTable::new().with_condition(
            1,
            "V101.Activate",
            ActivationCondition::new("X1 OR", vec![ConditionOperand::new("X1", "A", false)]),
        );
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "V101", 0, 0)])
            .with_conditions(conditions);

        let errors = build(&input, &config(), &GenerationOptions::default()).unwrap_err();

        assert!(errors[0].is(Problem::ConditionSyntax));
    }

    #[test]
    fn build_when_export_date_then_stamp_in_both_forms() {
        let options = GenerationOptions {
            export_date: Some(datetime!(2024-03-05 14:07:09 UTC)),
            ..GenerationOptions::default()
        };

        let plan = build(&GenerationInput::default(), &config(), &options).unwrap();

        let stamp = plan.stamp.unwrap();
        assert_eq!(stamp.listing, "2024-03-05 14:07:09");
        assert_eq!(stamp.export, "Tue Mar 05 14:07:09 2024");
    }

    #[test]
    fn from_rows_when_step_rows_without_tags_then_names_only() {
        let rows = vec![
            PhaseRow {
                phase_id: 1,
                step_no: 1,
                step_name: Some("Idle".to_string()),
                tag_name: None,
                i_type: None,
                pid_type: None,
            },
            PhaseRow {
                phase_id: 1,
                step_no: 2,
                step_name: Some("Fill".to_string()),
                tag_name: Some("V101".to_string()),
                i_type: Some(0),
                pid_type: None,
            },
        ];

        let input = GenerationInput::from_rows(&rows);

        assert_eq!(input.records, vec![ActivationRecord::new(1, 2, "V101", 0, 0)]);
        assert_eq!(input.step_names.get(&1).map(String::as_str), Some("Idle"));
        assert_eq!(input.step_names.len(), 2);
    }
}
