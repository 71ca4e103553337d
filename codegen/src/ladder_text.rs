//! Renders the plain-text ladder listing.
//!
//! ```text
//! ================...
//! Ladder Logic Listing
//! ================...
//!
//! ----------------...
//! Step 01 -- Fill
//! ----------------...
//! XIC(StepFlag[1].Flag)OTL(V101.Activate)
//! ```

use crate::plan::{GenerationPlan, PlannedActivation};
use crate::writer::TextWriter;

pub const TITLE: &str = "Ladder Logic Listing";

pub fn apply(plan: &GenerationPlan) -> String {
    let mut writer = TextWriter::new();

    writer.rule('=');
    writer.line(TITLE);
    if let Some(stamp) = &plan.stamp {
        writer.line(&format!("Generated: {}", stamp.listing));
    }
    writer.rule('=');
    writer.newline();

    for step in &plan.steps {
        writer.rule('-');
        writer.line(&step.title(" -- "));
        writer.rule('-');
        for activation in &step.activations {
            writer.line(&rung_text(activation));
        }
        writer.newline();
    }

    writer.finish()
}

/// The rung expression without terminator, shared with the L5X renderer.
pub fn rung_text(activation: &PlannedActivation) -> String {
    format!(
        "{}OTL({})",
        activation.condition.to_ladder(),
        activation.target()
    )
}
