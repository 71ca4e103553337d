use std::{
    collections::HashSet,
    env,
    error::Error,
    fmt::Write,
    fs,
    path::{Path, PathBuf},
    process,
};

const DEFINITIONS: &str = "resources/problem-codes.csv";

struct ProblemDef {
    /// The code that users know this as. Stays stable between releases so
    /// that scripts can match on it.
    code: String,
    /// The variant name. Not promised to stay the same between releases.
    name: String,
    message: String,
}

fn read_definitions(path: &Path) -> Result<Vec<ProblemDef>, Box<dyn Error>> {
    let src = fs::read_to_string(path)
        .map_err(|e| format!("Unable to read {}: {}", path.display(), e))?;

    let mut rdr = csv::Reader::from_reader(src.as_bytes());
    let mut defs = vec![];
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let [code, name, message] = [0, 1, 2].map(|idx| record.get(idx).map(str::trim));
        match (code, name, message) {
            (Some(code), Some(name), Some(message)) => defs.push(ProblemDef {
                code: code.to_string(),
                name: name.to_string(),
                message: message.to_string(),
            }),
            _ => return Err(format!("Row {} needs code, name and message", line + 2).into()),
        }
    }
    Ok(defs)
}

/// Rejects tables that would generate an enum that does not compile or
/// codes that collide.
fn validate(defs: &[ProblemDef]) -> Result<(), String> {
    if defs.is_empty() {
        return Err("The table defines no problems".to_string());
    }

    let mut names = HashSet::new();
    let mut previous: Option<&str> = None;
    for def in defs {
        let digits = def.code.strip_prefix('P').unwrap_or_default();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Code '{}' is not of the form P0000", def.code));
        }
        if previous.is_some_and(|prev| prev >= def.code.as_str()) {
            return Err(format!("Code '{}' is out of order or repeated", def.code));
        }
        previous = Some(&def.code);

        let mut chars = def.name.chars();
        let starts_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
        if !starts_upper || !chars.all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("Name '{}' of {} is not a type name", def.name, def.code));
        }
        if !names.insert(def.name.as_str()) {
            return Err(format!("Name '{}' is used more than once", def.name));
        }

        if def.message.is_empty() || def.message.contains(['"', '\\']) {
            return Err(format!("Message of {} is empty or needs escaping", def.code));
        }
    }
    Ok(())
}

fn render(defs: &[ProblemDef]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "/// Problems that generation can report.")?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]")?;
    writeln!(out, "pub enum Problem {{")?;
    for def in defs {
        writeln!(out, "    /// {}: {}.", def.code, def.message)?;
        writeln!(out, "    {},", def.name)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "impl Problem {{")?;
    writeln!(out, "    /// Every problem in code order.")?;
    writeln!(out, "    pub const ALL: [Problem; {}] = [", defs.len())?;
    for def in defs {
        writeln!(out, "        Problem::{},", def.name)?;
    }
    writeln!(out, "    ];")?;
    writeln!(out)?;

    writeln!(out, "    /// Returns the code users know the problem by.")?;
    writeln!(out, "    pub fn code(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in defs {
        writeln!(out, "            Problem::{} => \"{}\",", def.name, def.code)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    /// Returns the message for the kind of problem. The message does")?;
    writeln!(out, "    /// not depend on a particular occurrence.")?;
    writeln!(out, "    pub fn message(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for def in defs {
        writeln!(out, "            Problem::{} => \"{}\",", def.name, def.message)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    /// Finds the problem with the code, ignoring case.")?;
    writeln!(out, "    pub fn from_code(code: &str) -> Option<Problem> {{")?;
    writeln!(out, "        match code.trim().to_ascii_uppercase().as_str() {{")?;
    for def in defs {
        writeln!(out, "            \"{}\" => Some(Problem::{}),", def.code, def.name)?;
    }
    writeln!(out, "            _ => None,")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

fn create_problems() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={}", DEFINITIONS);

    let src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFINITIONS);
    let defs = read_definitions(&src_path)?;
    validate(&defs)?;

    let out_path = PathBuf::from(env::var("OUT_DIR")?).join("problems.rs");
    fs::write(&out_path, render(&defs)?)
        .map_err(|e| format!("Unable to write {}: {}", out_path.display(), e))?;
    Ok(())
}

fn main() {
    if let Err(err) = create_problems() {
        println!("cargo:warning=problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
