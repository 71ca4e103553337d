//! Renders the L5X ladder import document.
//!
//! The document holds a single program with the step flag data type, the
//! step flag array tag and one ladder routine per step. Each activation is
//! one rung. Text and attribute values go through the writer's escaping, so
//! any tag name produces a well-formed document.

use std::fmt::Display;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use stepgen_dsl::diagnostic::{Diagnostic, Label};
use stepgen_problems::Problem;

use crate::ladder_text::rung_text;
use crate::options::GenerationOptions;
use crate::plan::{GenerationPlan, PlannedStep};

pub const SCHEMA_REVISION: &str = "1.0";
pub const SOFTWARE_REVISION: &str = "37.00";
pub const STEP_FLAGS_TYPE: &str = "PhaseControl_StepFlags";

/// Smallest dimension of the step flag array.
pub const MIN_STEP_FLAG_DIMENSION: u32 = 128;

const BACKING_MEMBER: &str = "ZZZZZZZZZZPhaseContr0";

const FLAG_MEMBERS: [(&str, &str); 3] = [
    ("Flag", "Equal to"),
    ("FlagLE", "Less than or Equal to"),
    ("FlagGE", "Greater than or Equal to"),
];

pub fn apply(plan: &GenerationPlan, options: &GenerationOptions) -> Result<String, Diagnostic> {
    let mut doc = XmlDocument::new();

    doc.declaration()?;

    let mut root = vec![
        ("SchemaRevision", SCHEMA_REVISION.to_string()),
        ("SoftwareRevision", SOFTWARE_REVISION.to_string()),
        ("TargetType", "Program".to_string()),
        ("TargetName", options.program_name.clone()),
        ("ContainsContext", "true".to_string()),
    ];
    if let Some(stamp) = &plan.stamp {
        root.push(("ExportDate", stamp.export.clone()));
    }
    doc.start("RSLogix5000Content", &root)?;
    doc.start(
        "Controller",
        &[
            ("Use", "Context".to_string()),
            ("Name", options.controller_name.clone()),
        ],
    )?;

    data_types(&mut doc)?;

    doc.start("Programs", &[("Use", "Context".to_string())])?;
    doc.start(
        "Program",
        &[
            ("Use", "Target".to_string()),
            ("Name", options.program_name.clone()),
        ],
    )?;
    tags(&mut doc, plan, options)?;
    routines(&mut doc, plan, options)?;
    doc.end("Program")?;
    doc.end("Programs")?;

    doc.end("Controller")?;
    doc.end("RSLogix5000Content")?;

    doc.finish()
}

/// Name of the routine that holds the step's rungs, `CM_Valve_Step01`.
pub fn routine_name(options: &GenerationOptions, step_no: u32) -> String {
    format!("{}_Step{:02}", options.routine_prefix, step_no)
}

fn data_types(doc: &mut XmlDocument) -> Result<(), Diagnostic> {
    doc.start("DataTypes", &[("Use", "Context".to_string())])?;
    doc.start(
        "DataType",
        &[
            ("Name", STEP_FLAGS_TYPE.to_string()),
            ("Family", "NoFamily".to_string()),
            ("Class", "User".to_string()),
        ],
    )?;
    doc.text_element("Description", "Step Flags for Each Step")?;
    doc.start("Members", &[])?;
    doc.empty(
        "Member",
        &[
            ("Name", BACKING_MEMBER.to_string()),
            ("DataType", "SINT".to_string()),
            ("Dimension", "0".to_string()),
            ("Radix", "Decimal".to_string()),
            ("Hidden", "true".to_string()),
            ("ExternalAccess", "Read/Write".to_string()),
        ],
    )?;
    for (bit, (name, description)) in FLAG_MEMBERS.iter().enumerate() {
        doc.start(
            "Member",
            &[
                ("Name", name.to_string()),
                ("DataType", "BIT".to_string()),
                ("Dimension", "0".to_string()),
                ("Radix", "Decimal".to_string()),
                ("Hidden", "false".to_string()),
                ("Target", BACKING_MEMBER.to_string()),
                ("BitNumber", bit.to_string()),
                ("ExternalAccess", "Read/Write".to_string()),
            ],
        )?;
        doc.text_element("Description", description)?;
        doc.end("Member")?;
    }
    doc.end("Members")?;
    doc.end("DataType")?;
    doc.end("DataTypes")
}

fn tags(
    doc: &mut XmlDocument,
    plan: &GenerationPlan,
    options: &GenerationOptions,
) -> Result<(), Diagnostic> {
    let dimension = plan
        .steps
        .iter()
        .map(|step| step.number.saturating_add(1))
        .max()
        .unwrap_or_default()
        .max(MIN_STEP_FLAG_DIMENSION);

    doc.start("Tags", &[])?;
    doc.start(
        "Tag",
        &[
            ("Name", options.step_flag_tag.clone()),
            ("TagType", "Base".to_string()),
            ("DataType", STEP_FLAGS_TYPE.to_string()),
            ("Dimensions", dimension.to_string()),
            ("Constant", "false".to_string()),
            ("ExternalAccess", "Read/Write".to_string()),
        ],
    )?;
    doc.start("Comments", &[])?;
    for step in &plan.steps {
        if let Some(name) = step.name.as_deref().filter(|name| !name.is_empty()) {
            doc.start(
                "Comment",
                &[("Operand", format!("[{}]", step.number))],
            )?;
            doc.text(name)?;
            doc.end("Comment")?;
        }
    }
    doc.end("Comments")?;
    doc.end("Tag")?;
    doc.end("Tags")
}

fn routines(
    doc: &mut XmlDocument,
    plan: &GenerationPlan,
    options: &GenerationOptions,
) -> Result<(), Diagnostic> {
    doc.start("Routines", &[])?;
    for step in &plan.steps {
        routine(doc, step, options)?;
    }
    doc.end("Routines")
}

fn routine(
    doc: &mut XmlDocument,
    step: &PlannedStep,
    options: &GenerationOptions,
) -> Result<(), Diagnostic> {
    doc.start(
        "Routine",
        &[
            ("Name", routine_name(options, step.number)),
            ("Type", "RLL".to_string()),
        ],
    )?;
    doc.text_element("Description", &step.title(" -- "))?;
    doc.start("RLLContent", &[])?;
    for (number, activation) in step.activations.iter().enumerate() {
        doc.start(
            "Rung",
            &[("Number", number.to_string()), ("Type", "N".to_string())],
        )?;
        doc.text_element("Text", &format!("{};", rung_text(activation)))?;
        doc.end("Rung")?;
    }
    doc.end("RLLContent")?;
    doc.end("Routine")
}

fn xml_error(err: impl Display) -> Diagnostic {
    Diagnostic::problem(
        Problem::XmlWrite,
        Label::unspecified(format!("writing L5X document: {}", err)),
    )
}

struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event) -> Result<(), Diagnostic> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn declaration(&mut self) -> Result<(), Diagnostic> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
    }

    fn element<'a>(name: &'a str, attributes: &'a [(&'a str, String)]) -> BytesStart<'a> {
        BytesStart::new(name).with_attributes(
            attributes
                .iter()
                .map(|(key, value)| (*key, value.as_str())),
        )
    }

    fn start(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<(), Diagnostic> {
        self.write(Event::Start(Self::element(name, attributes)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<(), Diagnostic> {
        self.write(Event::Empty(Self::element(name, attributes)))
    }

    fn end(&mut self, name: &str) -> Result<(), Diagnostic> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, content: &str) -> Result<(), Diagnostic> {
        self.write(Event::Text(BytesText::new(content)))
    }

    fn text_element(&mut self, name: &str, content: &str) -> Result<(), Diagnostic> {
        self.start(name, &[])?;
        self.text(content)?;
        self.end(name)
    }

    fn finish(self) -> Result<String, Diagnostic> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(xml_error)
    }
}
