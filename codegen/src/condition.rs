//! Compiles activation conditions into ladder and SCL expressions.
//!
//! A condition expression combines operand labels with `AND`, `OR` and
//! parentheses. Compiling binds each label to its operand so that the
//! renderers only see contacts on tags.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use stepgen_dsl::condition::ActivationCondition;
use stepgen_dsl::diagnostic::{Diagnostic, Label};
use stepgen_problems::Problem;

use crate::options::GenerationOptions;

lazy_static! {
    static ref STEP_FLAG_OPERAND: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\[(\d+)\]\.[Ff][Ll][Aa][Gg]$").unwrap();
}

/// An expression over operand labels, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Label(String),
    All(Vec<Expr>),
    Any(Vec<Expr>),
}

impl Expr {
    fn all(mut items: Vec<Expr>) -> Expr {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::All(items)
        }
    }

    fn any(mut items: Vec<Expr>) -> Expr {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Any(items)
        }
    }
}

peg::parser! {
    grammar expression_parser() for str {
        rule _ = quiet!{[' ' | '\t' | '\r' | '\n']*}

        rule ident_char() = ['A'..='Z' | 'a'..='z' | '0'..='9' | '_']

        rule and_keyword() = ['A' | 'a'] ['N' | 'n'] ['D' | 'd'] !ident_char()

        rule or_keyword() = ['O' | 'o'] ['R' | 'r'] !ident_char()

        rule label() -> Expr
            = !(and_keyword() / or_keyword()) l:$(['A'..='Z' | 'a'..='z' | '_'] ident_char()*) {
                Expr::Label(l.to_string())
            }

        rule atom() -> Expr
            = label()
            / "(" _ e:any() _ ")" { e }

        rule all() -> Expr
            = items:(atom() ++ (_ and_keyword() _)) { Expr::all(items) }

        rule any() -> Expr
            = items:(all() ++ (_ or_keyword() _)) { Expr::any(items) }

        pub rule expression() -> Expr
            = _ e:any() _ { e }
    }
}

/// Parses a condition expression such as `X1 AND (X2 OR X3)`.
pub fn parse_expression(source: &str) -> Result<Expr, String> {
    expression_parser::expression(source).map_err(|e| e.to_string())
}

/// A condition bound to tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Contact { tag: String, negated: bool },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    /// The default condition: the step's own flag.
    pub fn step_flag(step_no: u32, options: &GenerationOptions) -> Self {
        Condition::Contact {
            tag: options.step_flag(step_no),
            negated: false,
        }
    }

    /// Renders the condition as ladder instructions. Series contacts are
    /// concatenated and parallel branches are written as `[a,b]`.
    pub fn to_ladder(&self) -> String {
        match self {
            Condition::Contact { tag, negated } => {
                let instruction = if *negated { "XIO" } else { "XIC" };
                format!("{}({})", instruction, tag)
            }
            Condition::All(items) => items.iter().map(Condition::to_ladder).collect(),
            Condition::Any(items) => {
                let branches: Vec<String> = items.iter().map(Condition::to_ladder).collect();
                format!("[{}]", branches.join(","))
            }
        }
    }

    /// Renders the condition as an SCL boolean expression. Step flag
    /// operands become members of the SCL step flag structure.
    pub fn to_scl(&self, options: &GenerationOptions) -> String {
        match self {
            Condition::Contact { tag, negated } => {
                let operand = scl_operand(tag, options);
                if *negated {
                    format!("NOT {}", operand)
                } else {
                    operand
                }
            }
            Condition::All(items) => items
                .iter()
                .map(|item| match item {
                    Condition::Any(_) => format!("({})", item.to_scl(options)),
                    _ => item.to_scl(options),
                })
                .collect::<Vec<_>>()
                .join(" AND "),
            Condition::Any(items) => items
                .iter()
                .map(|item| item.to_scl(options))
                .collect::<Vec<_>>()
                .join(" OR "),
        }
    }

    /// True when the condition is just the step's own flag, which the SCL
    /// block already tests.
    pub fn is_step_flag_of(&self, step_no: u32, options: &GenerationOptions) -> bool {
        match self {
            Condition::Contact {
                tag,
                negated: false,
            } => step_flag_number(tag, options) == Some(step_no),
            _ => false,
        }
    }
}

/// Returns the step number when the tag is an element of the ladder step
/// flag array, for example `StepFlag[3].Flag`.
fn step_flag_number(tag: &str, options: &GenerationOptions) -> Option<u32> {
    let captures = STEP_FLAG_OPERAND.captures(tag.trim())?;
    if !captures[1].eq_ignore_ascii_case(&options.step_flag_tag) {
        return None;
    }
    captures[2].parse().ok()
}

fn scl_operand(tag: &str, options: &GenerationOptions) -> String {
    match step_flag_number(tag, options) {
        Some(step_no) => options.scl_step_member(step_no),
        None => tag.to_string(),
    }
}

/// Binds the condition's expression to its operands.
///
/// `target` is the activation the condition belongs to and only serves to
/// make diagnostics recognizable.
pub fn compile(
    condition: &ActivationCondition,
    step_no: u32,
    target: &str,
) -> Result<Condition, Diagnostic> {
    let expr = parse_expression(&condition.expression).map_err(|err| {
        Diagnostic::problem(
            Problem::ConditionSyntax,
            Label::step(step_no, format!("condition for '{}': {}", target, err)),
        )
        .with_context("expression", &condition.expression)
    })?;

    let operands: HashMap<String, (&str, bool)> = condition
        .conditions
        .iter()
        .map(|op| (op.label.trim().to_uppercase(), (op.tag.as_str(), op.negated)))
        .collect();

    bind(&expr, &operands).map_err(|label| {
        Diagnostic::problem(
            Problem::ConditionUndefinedLabel,
            Label::step(
                step_no,
                format!("condition for '{}' uses label '{}'", target, label),
            ),
        )
        .with_context("expression", &condition.expression)
    })
}

fn bind(expr: &Expr, operands: &HashMap<String, (&str, bool)>) -> Result<Condition, String> {
    match expr {
        Expr::Label(label) => operands
            .get(&label.to_uppercase())
            .map(|(tag, negated)| Condition::Contact {
                tag: tag.to_string(),
                negated: *negated,
            })
            .ok_or_else(|| label.clone()),
        Expr::All(items) => Ok(Condition::All(
            items
                .iter()
                .map(|item| bind(item, operands))
                .collect::<Result<_, _>>()?,
        )),
        Expr::Any(items) => Ok(Condition::Any(
            items
                .iter()
                .map(|item| bind(item, operands))
                .collect::<Result<_, _>>()?,
        )),
    }
}
