//! Custom activation conditions.
//!
//! By default an activation fires on its step flag alone. A condition
//! replaces that contact with a boolean combination of other contacts. The
//! expression refers to operands by label (for example `X1 AND (X2 OR X3)`)
//! and each operand names the tag it reads and whether it is negated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_expression() -> String {
    String::from("X1")
}

/// One contact of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionOperand {
    pub label: String,
    pub tag: String,
    #[serde(default)]
    pub negated: bool,
}

impl ConditionOperand {
    pub fn new(label: impl Into<String>, tag: impl Into<String>, negated: bool) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
            negated,
        }
    }
}

/// The condition under which one activation fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationCondition {
    #[serde(default = "default_expression")]
    pub expression: String,
    #[serde(default)]
    pub conditions: Vec<ConditionOperand>,
}

impl ActivationCondition {
    pub fn new(expression: impl Into<String>, conditions: Vec<ConditionOperand>) -> Self {
        Self {
            expression: expression.into(),
            conditions,
        }
    }

    /// A condition without operands does not replace the step flag.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Conditions keyed by step number and then by the activation's tag with
/// its suffix (for example `V101.Activate`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionTable {
    steps: BTreeMap<u32, BTreeMap<String, ActivationCondition>>,
}

impl ConditionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(
        mut self,
        step_no: u32,
        target: impl Into<String>,
        condition: ActivationCondition,
    ) -> Self {
        self.steps
            .entry(step_no)
            .or_default()
            .insert(target.into(), condition);
        self
    }

    /// Returns the condition for the activation target in the step.
    pub fn get(&self, step_no: u32, target: &str) -> Option<&ActivationCondition> {
        self.steps.get(&step_no).and_then(|step| step.get(target))
    }

    /// Iterates over every condition as `(step_no, target, condition)`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str, &ActivationCondition)> {
        self.steps.iter().flat_map(|(step_no, step)| {
            step.iter()
                .map(move |(target, condition)| (*step_no, target.as_str(), condition))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.values().all(BTreeMap::is_empty)
    }
}
