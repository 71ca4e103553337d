//! Renders the structured-text (SCL) source.
//!
//! Every step becomes a region with one conditional block:
//!
//! ```text
//! REGION Step 01 - Fill
//!     IF #MyStepFlag.Step001 THEN
//!         "V101".Activate := TRUE;
//!         RETURN;
//!     END_IF;
//! END_REGION ;
//! ```

use crate::options::GenerationOptions;
use crate::plan::{GenerationPlan, PlannedActivation};
use crate::writer::{TextWriter, RULE_WIDTH};

pub const TITLE: &str = "Structured Text (SCL)";

pub fn apply(plan: &GenerationPlan, options: &GenerationOptions) -> String {
    let mut writer = TextWriter::new();

    let rule = "=".repeat(RULE_WIDTH);
    writer.line(&comment(&rule));
    writer.line(&comment(TITLE));
    if let Some(stamp) = &plan.stamp {
        writer.line(&comment(&format!("Generated: {}", stamp.listing)));
    }
    writer.line(&comment(&rule));
    writer.newline();

    for step in &plan.steps {
        writer.line(&format!("REGION {}", step.title(" - ")));
        writer.indent();
        writer.line(&format!(
            "IF {} THEN",
            options.scl_step_member(step.number)
        ));
        writer.indent();
        for activation in &step.activations {
            writer.line(&assignment(activation, step.number, options));
        }
        writer.line("RETURN;");
        writer.outdent();
        writer.line("END_IF;");
        writer.outdent();
        writer.line("END_REGION ;");
        writer.newline();
    }

    writer.finish()
}

fn comment(text: &str) -> String {
    format!("(* {} *)", text)
}

fn assignment(activation: &PlannedActivation, step_no: u32, options: &GenerationOptions) -> String {
    let target = if options.quote_scl_tags {
        format!("\"{}\"{}", activation.tag_name, activation.suffix)
    } else {
        activation.target()
    };

    // The block already tests the step's own flag.
    let value = if activation.condition.is_step_flag_of(step_no, options) {
        String::from("TRUE")
    } else {
        activation.condition.to_scl(options)
    };

    format!("{} := {};", target, value)
}

#[cfg(test)]
mod test {
    use stepgen_dsl::activation::ActivationRecord;
    use stepgen_dsl::condition::{ActivationCondition, ConditionOperand, ConditionTable};
    use stepgen_dsl::configuration::Configuration;

    use super::apply;
    use crate::options::GenerationOptions;
    use crate::plan::{build, GenerationInput};

    fn render(input: GenerationInput, options: GenerationOptions) -> String {
        let plan = build(&input, &Configuration::default(), &options).unwrap();
        apply(&plan, &options)
    }

    #[test]
    fn apply_when_single_valve_then_region_block() {
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "V101", 0, 0)])
            .with_step_name(1, "Fill");

        let text = render(input, GenerationOptions::default());

        assert!(text.contains(
            "REGION Step 01 - Fill\n    IF #MyStepFlag.Step001 THEN\n        \"V101\".Activate := TRUE;\n        RETURN;\n    END_IF;\nEND_REGION ;\n"
        ));
    }

    #[test]
    fn apply_when_no_quote_then_bare_tag() {
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 1, "V101", 0, 0)]);
        let options = GenerationOptions {
            quote_scl_tags: false,
            ..GenerationOptions::default()
        };

        let text = render(input, options);

        assert!(text.contains("        V101.Activate := TRUE;\n"));
    }

    #[test]
    fn apply_when_empty_named_step_then_block_with_return_only() {
        let input = GenerationInput::default().with_step_name(5, "Hold");

        let text = render(input, GenerationOptions::default());

        assert!(text.contains("    IF #MyStepFlag.Step005 THEN\n        RETURN;\n    END_IF;\n"));
    }

    #[test]
    fn apply_when_custom_condition_then_boolean_expression() {
        let conditions = ConditionTable::new().with_condition(
            2,
            "V101.Activate",
            ActivationCondition::new(
                "X1 AND X2",
                vec![
                    ConditionOperand::new("X1", "StepFlag[2].Flag", false),
                    ConditionOperand::new("X2", "LS101", true),
                ],
            ),
        );
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 2, "V101", 0, 0)])
            .with_conditions(conditions);

        let text = render(input, GenerationOptions::default());

        assert!(text.contains("\"V101\".Activate := #MyStepFlag.Step002 AND NOT LS101;"));
    }

    #[test]
    fn apply_when_condition_is_own_step_flag_then_true() {
        let conditions = ConditionTable::new().with_condition(
            2,
            "V101.Activate",
            ActivationCondition::new(
                "X1",
                vec![ConditionOperand::new("X1", "StepFlag[2].Flag", false)],
            ),
        );
        let input = GenerationInput::new(vec![ActivationRecord::new(1, 2, "V101", 0, 0)])
            .with_conditions(conditions);

        let text = render(input, GenerationOptions::default());

        assert!(text.contains("\"V101\".Activate := TRUE;"));
    }
}
