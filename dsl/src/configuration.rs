//! The configuration that maps activation type codes to suffixes.
//!
//! Resolution is two-level: a type code maps to a type name, and the type
//! name maps to a suffix rule. A configuration is an immutable value. Editing
//! produces a new value that the caller can save; nothing is changed in
//! place while a generation is in flight.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stepgen_problems::Problem;
use thiserror::Error;

use crate::diagnostic::{Diagnostic, Label};

/// The type name that selects the PID branch unless configured otherwise.
pub const DEFAULT_PID_TYPE_NAME: &str = "PID";

/// How a type name maps to a suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixRule {
    /// The same suffix for every record. May be empty.
    Plain(String),

    /// A suffix chosen by the record's pid type, with a fallback for any
    /// pid type that has no case.
    ByPidType {
        cases: BTreeMap<i32, String>,
        otherwise: String,
    },
}

impl SuffixRule {
    /// Returns the suffix this rule gives a record with the pid type.
    pub fn suffix_for(&self, pid_type: i32) -> &str {
        match self {
            SuffixRule::Plain(suffix) => suffix,
            SuffixRule::ByPidType { cases, otherwise } => {
                cases.get(&pid_type).unwrap_or(otherwise)
            }
        }
    }
}

impl From<&str> for SuffixRule {
    fn from(value: &str) -> Self {
        SuffixRule::Plain(value.to_string())
    }
}

impl From<String> for SuffixRule {
    fn from(value: String) -> Self {
        SuffixRule::Plain(value)
    }
}

/// Excludes records with a pid type from generation.
///
/// Without `only` the rule applies to every type code; type codes listed in
/// `except` are never excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub pid_type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<i32>,
}

impl ExclusionRule {
    pub fn matches(&self, i_type: i32, pid_type: i32) -> bool {
        pid_type == self.pid_type
            && self.only.as_ref().map_or(true, |only| only.contains(&i_type))
            && !self.except.contains(&i_type)
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid_type={}", self.pid_type)?;
        if let Some(only) = &self.only {
            write!(f, " only={:?}", only)?;
        }
        if !self.except.is_empty() {
            write!(f, " except={:?}", self.except)?;
        }
        Ok(())
    }
}

/// Errors from loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration document is not valid: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("key '{key}' in {section} is not an integer code")]
    InvalidKey { section: &'static str, key: String },

    #[error("code {code} appears more than once in {section} (as '{first}' and '{second}')")]
    DuplicateKey {
        section: &'static str,
        code: i32,
        first: String,
        second: String,
    },

    #[error("type name '{name}' appears more than once in {section}")]
    DuplicateName { section: &'static str, name: String },
}

impl ConfigError {
    /// Converts the error into a diagnostic associated with a configuration
    /// key (or the document as a whole).
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigError::Malformed(err) => Diagnostic::problem(
                Problem::ConfigMalformed,
                Label::configuration("", err.to_string()),
            ),
            ConfigError::InvalidKey { section, key } => Diagnostic::problem(
                Problem::ConfigInvalidKey,
                Label::configuration(format!("{}.{}", section, key), self.to_string()),
            ),
            ConfigError::DuplicateKey { section, code, .. } => Diagnostic::problem(
                Problem::ConfigDuplicateKey,
                Label::configuration(format!("{}.{}", section, code), self.to_string()),
            ),
            ConfigError::DuplicateName { section, name } => Diagnostic::problem(
                Problem::ConfigDuplicateKey,
                Label::configuration(format!("{}.{}", section, name), self.to_string()),
            ),
        }
    }
}

/// The mappings that drive suffix resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    type_mapping: BTreeMap<i32, String>,
    suffix_mapping: BTreeMap<String, SuffixRule>,
    pid_type_mapping: BTreeMap<i32, String>,
    pid_type_name: String,
    exclusions: Vec<ExclusionRule>,
}

impl Default for Configuration {
    fn default() -> Self {
        let type_mapping = [
            (0, "Valve"),
            (1, "ValveLL"),
            (2, "ValveUL"),
            (6, "AO"),
            (7, "DO"),
            (8, DEFAULT_PID_TYPE_NAME),
            (10, "Comm"),
            (13, "VSD"),
            (14, "TOT"),
        ];
        let suffix_mapping = [
            ("Valve", SuffixRule::from(".Activate")),
            ("ValveLL", SuffixRule::from(".ActivateLL")),
            ("ValveUL", SuffixRule::from(".ActivateUL")),
            ("AO", SuffixRule::from(".Activate")),
            ("DO", SuffixRule::from(".Activate")),
            ("VSD", SuffixRule::from(".Activate")),
            (
                "TOT",
                SuffixRule::ByPidType {
                    cases: BTreeMap::from([(2, ".ResetTotalizer".to_string())]),
                    otherwise: ".EnableTotalizer".to_string(),
                },
            ),
        ];
        let pid_type_mapping = [(0, "N"), (1, "S"), (2, "R"), (3, "SP"), (4, "FO")];

        Self {
            type_mapping: type_mapping
                .into_iter()
                .map(|(code, name)| (code, name.to_string()))
                .collect(),
            suffix_mapping: suffix_mapping
                .into_iter()
                .map(|(name, rule)| (name.to_string(), rule))
                .collect(),
            pid_type_mapping: pid_type_mapping
                .into_iter()
                .map(|(code, label)| (code, label.to_string()))
                .collect(),
            pid_type_name: DEFAULT_PID_TYPE_NAME.to_string(),
            exclusions: vec![],
        }
    }
}

impl Configuration {
    /// Creates a configuration with no mappings at all.
    pub fn empty() -> Self {
        Self {
            type_mapping: BTreeMap::new(),
            suffix_mapping: BTreeMap::new(),
            pid_type_mapping: BTreeMap::new(),
            pid_type_name: DEFAULT_PID_TYPE_NAME.to_string(),
            exclusions: vec![],
        }
    }

    /// Loads a configuration from a JSON document. Sections that are absent
    /// take their default values.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let document: ConfigurationDocument = serde_json::from_str(content)?;
        let defaults = Configuration::default();

        let type_mapping = match document.type_mapping {
            Some(entries) => entries.into_codes("type_mapping")?,
            None => defaults.type_mapping,
        };
        let suffix_mapping: BTreeMap<String, SuffixRule> = match document.suffix_mapping {
            Some(rules) => rules
                .into_names("suffix_mapping")?
                .into_iter()
                .map(|(name, rule)| Ok((name, rule.into_rule()?)))
                .collect::<Result<_, ConfigError>>()?,
            None => defaults.suffix_mapping,
        };
        let pid_type_mapping = match document.pid_type_mapping {
            Some(entries) => entries.into_codes("pid_type_mapping")?,
            None => defaults.pid_type_mapping,
        };

        Ok(Self {
            type_mapping,
            suffix_mapping,
            pid_type_mapping,
            pid_type_name: document.pid_type_name.unwrap_or(defaults.pid_type_name),
            exclusions: document.exclusions.unwrap_or(defaults.exclusions),
        })
    }

    /// Writes the configuration as a pretty-printed JSON document.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        let document = ConfigurationDocument {
            type_mapping: Some(KeyedEntries::from_codes(&self.type_mapping)),
            suffix_mapping: Some(KeyedEntries(
                self.suffix_mapping
                    .iter()
                    .map(|(name, rule)| (name.clone(), SuffixRuleDocument::from_rule(rule)))
                    .collect(),
            )),
            pid_type_mapping: Some(KeyedEntries::from_codes(&self.pid_type_mapping)),
            pid_type_name: Some(self.pid_type_name.clone()),
            exclusions: Some(self.exclusions.clone()),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Returns a configuration where the type code maps to the name.
    pub fn with_type(mut self, i_type: i32, type_name: impl Into<String>) -> Self {
        self.type_mapping.insert(i_type, type_name.into());
        self
    }

    /// Returns a configuration where the type code has no mapping.
    pub fn without_type(mut self, i_type: i32) -> Self {
        self.type_mapping.remove(&i_type);
        self
    }

    /// Returns a configuration where the type name resolves with the rule.
    pub fn with_suffix(mut self, type_name: impl Into<String>, rule: impl Into<SuffixRule>) -> Self {
        self.suffix_mapping.insert(type_name.into(), rule.into());
        self
    }

    /// Returns a configuration where the type name has no suffix entry.
    pub fn without_suffix(mut self, type_name: &str) -> Self {
        self.suffix_mapping.remove(type_name);
        self
    }

    pub fn with_pid_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.pid_type_name = type_name.into();
        self
    }

    pub fn with_pid_label(mut self, pid_type: i32, label: impl Into<String>) -> Self {
        self.pid_type_mapping.insert(pid_type, label.into());
        self
    }

    pub fn with_exclusion(mut self, rule: ExclusionRule) -> Self {
        self.exclusions.push(rule);
        self
    }

    /// Returns the type name for the type code, if there is one.
    pub fn type_name(&self, i_type: i32) -> Option<&str> {
        self.type_mapping.get(&i_type).map(String::as_str)
    }

    /// Returns the suffix rule for the type name, if there is one.
    pub fn suffix_rule(&self, type_name: &str) -> Option<&SuffixRule> {
        self.suffix_mapping.get(type_name)
    }

    /// The type name that selects the PID branch.
    pub fn pid_type_name(&self) -> &str {
        &self.pid_type_name
    }

    /// Returns the short label for the pid type, if there is one.
    pub fn pid_label(&self, pid_type: i32) -> Option<&str> {
        self.pid_type_mapping.get(&pid_type).map(String::as_str)
    }

    /// Returns the first exclusion rule that matches the record's codes.
    pub fn exclusion_for(&self, i_type: i32, pid_type: i32) -> Option<&ExclusionRule> {
        self.exclusions
            .iter()
            .find(|rule| rule.matches(i_type, pid_type))
    }

    pub fn type_mapping(&self) -> &BTreeMap<i32, String> {
        &self.type_mapping
    }

    pub fn suffix_mapping(&self) -> &BTreeMap<String, SuffixRule> {
        &self.suffix_mapping
    }

    pub fn pid_type_mapping(&self) -> &BTreeMap<i32, String> {
        &self.pid_type_mapping
    }

    pub fn exclusions(&self) -> &[ExclusionRule] {
        &self.exclusions
    }
}

/// The serialized form of a configuration. Every section is optional so
/// that a document can override only part of the defaults.
#[derive(Serialize, Deserialize)]
struct ConfigurationDocument {
    #[serde(default)]
    type_mapping: Option<KeyedEntries<String>>,
    #[serde(default)]
    suffix_mapping: Option<KeyedEntries<SuffixRuleDocument>>,
    #[serde(default)]
    pid_type_mapping: Option<KeyedEntries<String>>,
    #[serde(default)]
    pid_type_name: Option<String>,
    #[serde(default)]
    exclusions: Option<Vec<ExclusionRule>>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SuffixRuleDocument {
    Plain(String),
    ByPidType {
        by_pid_type: KeyedEntries<String>,
        #[serde(default)]
        otherwise: String,
    },
}

impl SuffixRuleDocument {
    fn from_rule(rule: &SuffixRule) -> Self {
        match rule {
            SuffixRule::Plain(suffix) => SuffixRuleDocument::Plain(suffix.clone()),
            SuffixRule::ByPidType { cases, otherwise } => SuffixRuleDocument::ByPidType {
                by_pid_type: KeyedEntries::from_codes(cases),
                otherwise: otherwise.clone(),
            },
        }
    }

    fn into_rule(self) -> Result<SuffixRule, ConfigError> {
        match self {
            SuffixRuleDocument::Plain(suffix) => Ok(SuffixRule::Plain(suffix)),
            SuffixRuleDocument::ByPidType {
                by_pid_type,
                otherwise,
            } => Ok(SuffixRule::ByPidType {
                cases: by_pid_type.into_codes("suffix_mapping.by_pid_type")?,
                otherwise,
            }),
        }
    }
}

/// Map entries in document order with their keys as written.
///
/// A JSON object read into a map keeps only the last of duplicate keys, and
/// `"1"` and `"01"` name the same code. Keeping the raw entries lets the
/// loader reject both cases instead of silently picking one. Entries keyed by
/// type name are read the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyedEntries<V>(Vec<(String, V)>);

impl<V: Clone> KeyedEntries<V> {
    fn from_codes(codes: &BTreeMap<i32, V>) -> Self {
        KeyedEntries(
            codes
                .iter()
                .map(|(code, value)| (code.to_string(), value.clone()))
                .collect(),
        )
    }

    fn into_codes(self, section: &'static str) -> Result<BTreeMap<i32, V>, ConfigError> {
        let mut codes: BTreeMap<i32, (String, V)> = BTreeMap::new();
        for (key, value) in self.0 {
            let code = key
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidKey {
                    section,
                    key: key.clone(),
                })?;
            if let Some((first, _)) = codes.get(&code) {
                return Err(ConfigError::DuplicateKey {
                    section,
                    code,
                    first: first.clone(),
                    second: key,
                });
            }
            codes.insert(code, (key, value));
        }
        Ok(codes
            .into_iter()
            .map(|(code, (_, value))| (code, value))
            .collect())
    }
}

impl<V> KeyedEntries<V> {
    fn into_names(self, section: &'static str) -> Result<Vec<(String, V)>, ConfigError> {
        let mut seen = BTreeSet::new();
        if let Some((name, _)) = self.0.iter().find(|(name, _)| !seen.insert(name.as_str())) {
            return Err(ConfigError::DuplicateName {
                section,
                name: name.clone(),
            });
        }
        Ok(self.0)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for KeyedEntries<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = KeyedEntries<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(KeyedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for KeyedEntries<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
