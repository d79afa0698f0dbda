//! Declarative argument schema model shared by schema producers and the
//! `argot` binding engine.
//!
//! This crate intentionally does **not** depend on the engine. The types here
//! describe the accepted arguments of a command (names, positions, arity,
//! value kinds, validation rules) and are used for:
//! - building a validated [`ArgumentSchema`] through [`SchemaBuilder`]
//! - storing schemas as JSON manifest data (kebab-case field names)
//!
//! An [`ArgumentSchema`] is immutable once built and owns no per-parse state,
//! so it can be shared across any number of parse invocations.

mod builder;

pub use builder::SchemaBuilder;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A converted argument value.
///
/// Untagged on the wire so schema JSON can write `"default-value": 5` and
/// bound results serialize as natural JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Path(PathBuf),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Numeric view: integers coerce losslessly enough for validation bounds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            Value::Path(p) => p.to_str(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Canonical string form. Scalars round-trip through their built-in
/// converter; `Null` has no canonical form and renders empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

/// Element type of an argument's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    #[default]
    String,
    Bool,
    Int,
    Uint,
    Float,
    Path,
}

impl ValueKind {
    /// Human-readable type hint used in conversion error messages.
    pub fn describe(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Uint => "unsigned integer",
            ValueKind::Float => "number",
            ValueKind::Path => "path",
        }
    }
}

/// How many values an argument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arity {
    #[default]
    Single,
    /// Boolean presence flag; no value token is required.
    Switch,
    /// Ordered sequence, unbounded unless constrained by a validator.
    MultiValue,
    /// `key=value` pairs accumulated into an insertion-ordered map.
    Dictionary,
}

impl Arity {
    pub fn is_multi(self) -> bool {
        matches!(self, Arity::MultiValue | Arity::Dictionary)
    }
}

/// Whether supplying an argument aborts the remainder of parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelMode {
    #[default]
    None,
    Stop,
    StopWithHelp,
}

/// Pipeline stage a validator runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorStage {
    PreConversion,
    PostConversion,
    PostParse,
}

/// Declarative, serializable validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorSpec {
    /// Raw element value must not be empty.
    NonEmpty,
    /// Raw element value length bounds, in characters.
    StringLength {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Numeric bounds on the converted value.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Converted value's canonical form must be one of the listed strings.
    OneOf { values: Vec<String> },
    /// Converted value must not be null.
    NotNull,
    /// Bounds on the number of values of a multi-value or dictionary
    /// argument, checked after the whole token stream is consumed.
    ValueCount {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// If this argument was supplied, every listed argument must be too.
    Requires { arguments: Vec<String> },
    /// If this argument was supplied, no listed argument may be.
    Prohibits { arguments: Vec<String> },
    /// At least one of the listed arguments must be supplied.
    RequiresAny { arguments: Vec<String> },
}

impl ValidatorSpec {
    pub fn stage(&self) -> ValidatorStage {
        match self {
            ValidatorSpec::NonEmpty | ValidatorSpec::StringLength { .. } => {
                ValidatorStage::PreConversion
            }
            ValidatorSpec::Range { .. } | ValidatorSpec::OneOf { .. } | ValidatorSpec::NotNull => {
                ValidatorStage::PostConversion
            }
            ValidatorSpec::ValueCount { .. }
            | ValidatorSpec::Requires { .. }
            | ValidatorSpec::Prohibits { .. }
            | ValidatorSpec::RequiresAny { .. } => ValidatorStage::PostParse,
        }
    }
}

/// Custom per-element converter, taking precedence over the engine's
/// built-in converters for this argument.
#[derive(Clone)]
pub struct ConverterHook(pub Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>);

impl ConverterHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        ConverterHook(Arc::new(f))
    }
}

impl fmt::Debug for ConverterHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConverterHook")
    }
}

/// Custom validation hook with an explicit stage tag. Not serializable;
/// attached through the builder API only.
#[derive(Clone)]
pub enum ValidatorHook {
    /// Runs on the raw string element, before conversion.
    PreConversion(Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>),
    /// Runs on the converted value.
    PostConversion(Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>),
    /// Runs after the whole pass, against the full bound value set.
    PostParse(Arc<dyn Fn(&IndexMap<String, Value>) -> Result<(), String> + Send + Sync>),
}

impl ValidatorHook {
    pub fn stage(&self) -> ValidatorStage {
        match self {
            ValidatorHook::PreConversion(_) => ValidatorStage::PreConversion,
            ValidatorHook::PostConversion(_) => ValidatorStage::PostConversion,
            ValidatorHook::PostParse(_) => ValidatorStage::PostParse,
        }
    }
}

impl fmt::Debug for ValidatorHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorHook::PreConversion(_) => f.write_str("ValidatorHook::PreConversion"),
            ValidatorHook::PostConversion(_) => f.write_str("ValidatorHook::PostConversion"),
            ValidatorHook::PostParse(_) => f.write_str("ValidatorHook::PostParse"),
        }
    }
}

/// One declared argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentDef {
    /// Long name. At least one of `name` and `short` must be set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Single-character short name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_aliases: Vec<char>,
    /// Positional rank. Sparse values are permitted and normalized to
    /// `0..n` at schema-build time; ties break by declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default)]
    pub arity: Arity,
    #[serde(default)]
    pub required: bool,
    /// Used only when the argument is optional, unsupplied, and the default
    /// is not null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub value_kind: ValueKind,
    #[serde(default)]
    pub allows_null: bool,
    #[serde(default)]
    pub cancel: CancelMode,
    /// Element separator: a single supplied value splits on this character
    /// into multiple elements. No escaping is supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_separator: Option<char>,
    /// Dictionary key/value separator; `=` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_value_separator: Option<char>,
    #[serde(default)]
    pub allow_duplicate_keys: bool,
    /// Multi-value and dictionary arguments only: keep consuming
    /// whitespace-separated tokens until the next resolvable name token.
    #[serde(default)]
    pub consumes_runs: bool,
    /// Type hint for conversion error messages; the value kind's generic
    /// description when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorSpec>,
    #[serde(skip)]
    pub converter: Option<ConverterHook>,
    #[serde(skip)]
    pub validator_hooks: Vec<ValidatorHook>,
}

impl Default for ArgumentDef {
    fn default() -> Self {
        ArgumentDef {
            name: None,
            short: None,
            aliases: Vec::new(),
            short_aliases: Vec::new(),
            position: None,
            arity: Arity::Single,
            required: false,
            default_value: None,
            value_kind: ValueKind::String,
            allows_null: false,
            cancel: CancelMode::None,
            value_separator: None,
            key_value_separator: None,
            allow_duplicate_keys: false,
            consumes_runs: false,
            value_description: None,
            validators: Vec::new(),
            converter: None,
            validator_hooks: Vec::new(),
        }
    }
}

impl ArgumentDef {
    /// A single-value argument with a long name.
    pub fn named(name: impl Into<String>) -> Self {
        ArgumentDef {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A switch (boolean presence flag) with a long name.
    pub fn switch(name: impl Into<String>) -> Self {
        ArgumentDef {
            name: Some(name.into()),
            arity: Arity::Switch,
            value_kind: ValueKind::Bool,
            ..Default::default()
        }
    }

    /// A multi-value argument with a long name.
    pub fn multi_value(name: impl Into<String>) -> Self {
        ArgumentDef {
            name: Some(name.into()),
            arity: Arity::MultiValue,
            ..Default::default()
        }
    }

    /// A dictionary argument with a long name.
    pub fn dictionary(name: impl Into<String>) -> Self {
        ArgumentDef {
            name: Some(name.into()),
            arity: Arity::Dictionary,
            ..Default::default()
        }
    }

    /// A positional single-value argument. The name is still used for
    /// by-name supply and for error reporting.
    pub fn positional(name: impl Into<String>, position: usize) -> Self {
        ArgumentDef {
            name: Some(name.into()),
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn short_alias(mut self, alias: char) -> Self {
        self.short_aliases.push(alias);
        self
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = kind;
        self
    }

    pub fn allows_null(mut self) -> Self {
        self.allows_null = true;
        self
    }

    pub fn cancel(mut self, mode: CancelMode) -> Self {
        self.cancel = mode;
        self
    }

    pub fn value_separator(mut self, sep: char) -> Self {
        self.value_separator = Some(sep);
        self
    }

    pub fn key_value_separator(mut self, sep: char) -> Self {
        self.key_value_separator = Some(sep);
        self
    }

    pub fn allow_duplicate_keys(mut self) -> Self {
        self.allow_duplicate_keys = true;
        self
    }

    pub fn consumes_runs(mut self) -> Self {
        self.consumes_runs = true;
        self
    }

    pub fn value_description(mut self, desc: impl Into<String>) -> Self {
        self.value_description = Some(desc.into());
        self
    }

    pub fn validator(mut self, spec: ValidatorSpec) -> Self {
        self.validators.push(spec);
        self
    }

    pub fn convert_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.converter = Some(ConverterHook::new(f));
        self
    }

    pub fn validate_with(mut self, hook: ValidatorHook) -> Self {
        self.validator_hooks.push(hook);
        self
    }

    /// Canonical identity: the long name, or the short name when no long
    /// name is declared. Bound values are keyed by this.
    pub fn ident(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.short.map(|c| c.to_string()))
            .unwrap_or_default()
    }

    /// Type hint used in conversion error messages.
    pub fn describe_value(&self) -> &str {
        self.value_description
            .as_deref()
            .unwrap_or_else(|| self.value_kind.describe())
    }
}

/// Errors detected while building a schema. Any violation fails the build
/// before a single token is parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("argument definition at index {index} has neither a long nor a short name")]
    MissingName { index: usize },
    #[error("invalid argument name '{name}'")]
    InvalidName { name: String },
    #[error("duplicate argument name '{name}'")]
    DuplicateName { name: String },
    #[error("required positional argument '{name}' follows an optional positional argument")]
    RequiredPositionalAfterOptional { name: String },
    #[error("multi-value positional argument '{name}' must be the last positional argument")]
    MultiValuePositionalNotLast { name: String },
    #[error("switch argument '{name}' cannot be positional")]
    PositionalSwitch { name: String },
    #[error("invalid definition for argument '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },
    #[error("invalid validator on argument '{name}': {reason}")]
    InvalidValidator { name: String, reason: String },
    #[error("validator on argument '{name}' references unknown argument '{target}'")]
    UnknownValidatorTarget { name: String, target: String },
}

/// A validated, immutable argument schema.
///
/// Serializes as its definition list; deserialization re-runs validation, so
/// a schema loaded from JSON is as trustworthy as one built in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<ArgumentDef>", into = "Vec<ArgumentDef>")]
pub struct ArgumentSchema {
    defs: Vec<ArgumentDef>,
    idents: Vec<String>,
    positional: Vec<usize>,
}

impl TryFrom<Vec<ArgumentDef>> for ArgumentSchema {
    type Error = SchemaError;

    fn try_from(defs: Vec<ArgumentDef>) -> Result<Self, SchemaError> {
        ArgumentSchema::new(defs)
    }
}

impl From<ArgumentSchema> for Vec<ArgumentDef> {
    fn from(schema: ArgumentSchema) -> Self {
        schema.defs
    }
}

impl ArgumentSchema {
    /// Validate and normalize a definition list.
    ///
    /// Validation is a pure function of the declarations: the same input
    /// always produces the same accept/reject outcome.
    pub fn new(mut defs: Vec<ArgumentDef>) -> Result<Self, SchemaError> {
        for (index, def) in defs.iter().enumerate() {
            if def.name.is_none() && def.short.is_none() {
                return Err(SchemaError::MissingName { index });
            }
            for name in def.name.iter().chain(def.aliases.iter()) {
                if name.is_empty() || name.chars().any(char::is_whitespace) {
                    return Err(SchemaError::InvalidName { name: name.clone() });
                }
            }
            check_arity_settings(def)?;
            check_validators(def)?;
        }

        check_duplicate_names(&defs)?;

        let idents: Vec<String> = defs.iter().map(ArgumentDef::ident).collect();
        check_validator_targets(&defs, &idents)?;

        let positional = normalize_positions(&mut defs)?;

        Ok(ArgumentSchema {
            defs,
            idents,
            positional,
        })
    }

    pub fn defs(&self) -> &[ArgumentDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn def(&self, index: usize) -> &ArgumentDef {
        &self.defs[index]
    }

    pub fn ident(&self, index: usize) -> &str {
        &self.idents[index]
    }

    /// Definition indices in positional order.
    pub fn positional(&self) -> &[usize] {
        &self.positional
    }

    /// Look up a definition index by its canonical identity.
    pub fn find(&self, ident: &str) -> Option<usize> {
        self.idents.iter().position(|i| i == ident)
    }
}

fn check_arity_settings(def: &ArgumentDef) -> Result<(), SchemaError> {
    let name = def.ident();
    match def.arity {
        Arity::Switch => {
            if def.position.is_some() {
                return Err(SchemaError::PositionalSwitch { name });
            }
            if def.value_kind != ValueKind::Bool {
                return Err(SchemaError::InvalidDefinition {
                    name,
                    reason: "switch arity requires the bool value kind".into(),
                });
            }
        }
        Arity::Single | Arity::MultiValue | Arity::Dictionary => {}
    }
    if def.value_separator.is_some() && !def.arity.is_multi() {
        return Err(SchemaError::InvalidDefinition {
            name,
            reason: "value-separator requires multi-value or dictionary arity".into(),
        });
    }
    if def.consumes_runs && !def.arity.is_multi() {
        return Err(SchemaError::InvalidDefinition {
            name,
            reason: "consumes-runs requires multi-value or dictionary arity".into(),
        });
    }
    if (def.key_value_separator.is_some() || def.allow_duplicate_keys)
        && def.arity != Arity::Dictionary
    {
        return Err(SchemaError::InvalidDefinition {
            name,
            reason: "dictionary settings require dictionary arity".into(),
        });
    }
    Ok(())
}

fn check_validators(def: &ArgumentDef) -> Result<(), SchemaError> {
    let name = def.ident();
    for spec in &def.validators {
        match spec {
            ValidatorSpec::StringLength { min, max } | ValidatorSpec::ValueCount { min, max } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(SchemaError::InvalidValidator {
                            name,
                            reason: "minimum exceeds maximum".into(),
                        });
                    }
                }
                if matches!(spec, ValidatorSpec::ValueCount { .. }) && !def.arity.is_multi() {
                    return Err(SchemaError::InvalidValidator {
                        name,
                        reason: "value-count requires multi-value or dictionary arity".into(),
                    });
                }
            }
            ValidatorSpec::Range { min, max } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(SchemaError::InvalidValidator {
                            name,
                            reason: "minimum exceeds maximum".into(),
                        });
                    }
                }
                if !matches!(
                    def.value_kind,
                    ValueKind::Int | ValueKind::Uint | ValueKind::Float
                ) {
                    return Err(SchemaError::InvalidValidator {
                        name,
                        reason: "range requires a numeric value kind".into(),
                    });
                }
            }
            ValidatorSpec::OneOf { values } => {
                if values.is_empty() {
                    return Err(SchemaError::InvalidValidator {
                        name,
                        reason: "one-of requires at least one value".into(),
                    });
                }
            }
            ValidatorSpec::Requires { arguments }
            | ValidatorSpec::Prohibits { arguments }
            | ValidatorSpec::RequiresAny { arguments } => {
                if arguments.is_empty() {
                    return Err(SchemaError::InvalidValidator {
                        name,
                        reason: "cross-argument validator lists no arguments".into(),
                    });
                }
            }
            ValidatorSpec::NonEmpty | ValidatorSpec::NotNull => {}
        }
    }
    Ok(())
}

fn check_duplicate_names(defs: &[ArgumentDef]) -> Result<(), SchemaError> {
    let mut long_seen: Vec<&str> = Vec::new();
    let mut short_seen: Vec<char> = Vec::new();
    for def in defs {
        for name in def.name.iter().chain(def.aliases.iter()) {
            if long_seen.contains(&name.as_str()) {
                return Err(SchemaError::DuplicateName { name: name.clone() });
            }
            long_seen.push(name);
        }
        for &short in def.short.iter().chain(def.short_aliases.iter()) {
            if short_seen.contains(&short) {
                return Err(SchemaError::DuplicateName {
                    name: short.to_string(),
                });
            }
            short_seen.push(short);
        }
    }
    Ok(())
}

fn check_validator_targets(defs: &[ArgumentDef], idents: &[String]) -> Result<(), SchemaError> {
    for def in defs {
        for spec in &def.validators {
            let targets = match spec {
                ValidatorSpec::Requires { arguments }
                | ValidatorSpec::Prohibits { arguments }
                | ValidatorSpec::RequiresAny { arguments } => arguments.as_slice(),
                _ => continue,
            };
            for target in targets {
                if !idents.iter().any(|i| i == target) {
                    return Err(SchemaError::UnknownValidatorTarget {
                        name: def.ident(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Order positional entries by (declared position, declaration order),
/// normalize their positions to dense ranks, and enforce the positional
/// invariants.
fn normalize_positions(defs: &mut [ArgumentDef]) -> Result<Vec<usize>, SchemaError> {
    let mut positional: Vec<usize> = (0..defs.len())
        .filter(|&i| defs[i].position.is_some())
        .collect();
    positional.sort_by_key(|&i| (defs[i].position.unwrap_or(usize::MAX), i));

    let mut optional_seen = false;
    for (rank, &i) in positional.iter().enumerate() {
        let def = &defs[i];
        if def.required && optional_seen {
            return Err(SchemaError::RequiredPositionalAfterOptional { name: def.ident() });
        }
        if !def.required {
            optional_seen = true;
        }
        if def.arity.is_multi() && rank + 1 != positional.len() {
            return Err(SchemaError::MultiValuePositionalNotLast { name: def.ident() });
        }
        defs[i].position = Some(rank);
    }

    Ok(positional)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_normalize_sparse_values() {
        let schema = ArgumentSchema::new(vec![
            ArgumentDef::positional("second", 10),
            ArgumentDef::positional("first", 2),
        ])
        .unwrap();

        assert_eq!(schema.positional(), &[1, 0]);
        assert_eq!(schema.def(1).position, Some(0));
        assert_eq!(schema.def(0).position, Some(1));
    }

    #[test]
    fn position_ties_break_by_declaration_order() {
        let schema = ArgumentSchema::new(vec![
            ArgumentDef::positional("a", 0),
            ArgumentDef::positional("b", 0),
        ])
        .unwrap();
        assert_eq!(schema.positional(), &[0, 1]);
    }

    #[test]
    fn required_positional_after_optional_is_rejected() {
        let err = ArgumentSchema::new(vec![
            ArgumentDef::positional("opt", 0),
            ArgumentDef::positional("req", 1).required(),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RequiredPositionalAfterOptional {
                name: "req".into()
            }
        );
    }

    #[test]
    fn multi_value_positional_must_be_last() {
        let err = ArgumentSchema::new(vec![
            ArgumentDef::positional("rest", 0)
                .arity(Arity::MultiValue)
                .required(),
            ArgumentDef::positional("tail", 1).required(),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MultiValuePositionalNotLast {
                name: "rest".into()
            }
        );
    }

    #[test]
    fn duplicate_long_name_is_rejected() {
        let err = ArgumentSchema::new(vec![
            ArgumentDef::named("output"),
            ArgumentDef::named("verbose").alias("output"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateName {
                name: "output".into()
            }
        );
    }

    #[test]
    fn duplicate_short_name_is_rejected() {
        let err = ArgumentSchema::new(vec![
            ArgumentDef::named("output").short('o'),
            ArgumentDef::named("other").short('o'),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateName { name: "o".into() });
    }

    #[test]
    fn nameless_definition_is_rejected() {
        let err = ArgumentSchema::new(vec![ArgumentDef::default()]).unwrap_err();
        assert_eq!(err, SchemaError::MissingName { index: 0 });
    }

    #[test]
    fn positional_switch_is_rejected() {
        let err =
            ArgumentSchema::new(vec![ArgumentDef::switch("verbose").at_position(0)]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::PositionalSwitch {
                name: "verbose".into()
            }
        );
    }

    #[test]
    fn range_on_string_kind_is_rejected() {
        let err = ArgumentSchema::new(vec![ArgumentDef::named("level").validator(
            ValidatorSpec::Range {
                min: Some(0.0),
                max: Some(5.0),
            },
        )])
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValidator { .. }));
    }

    #[test]
    fn cross_argument_target_must_exist() {
        let err = ArgumentSchema::new(vec![ArgumentDef::switch("all").validator(
            ValidatorSpec::Requires {
                arguments: vec!["missing".into()],
            },
        )])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownValidatorTarget {
                name: "all".into(),
                target: "missing".into()
            }
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let defs = vec![
            ArgumentDef::positional("input", 5).required(),
            ArgumentDef::positional("rest", 9).arity(Arity::MultiValue),
            ArgumentDef::switch("verbose"),
        ];
        let first = ArgumentSchema::new(defs.clone()).unwrap();
        let again = ArgumentSchema::new(first.defs().to_vec()).unwrap();
        assert_eq!(first.positional(), again.positional());
        assert_eq!(
            first.defs().iter().map(|d| d.position).collect::<Vec<_>>(),
            again.defs().iter().map(|d| d.position).collect::<Vec<_>>()
        );
    }

    #[test]
    fn schema_round_trips_through_json() {
        let schema = ArgumentSchema::new(vec![
            ArgumentDef::positional("input", 0).required(),
            ArgumentDef::named("max-lines")
                .short('l')
                .kind(ValueKind::Int)
                .default_value(Value::Int(10)),
        ])
        .unwrap();

        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains(r#""value-kind":"int""#));

        let back: ArgumentSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.def(1).default_value, Some(Value::Int(10)));
        assert_eq!(back.positional(), schema.positional());
    }

    #[test]
    fn invalid_schema_json_is_rejected_on_load() {
        let json = r#"[
            { "name": "opt", "position": 0 },
            { "name": "req", "position": 1, "required": true }
        ]"#;
        let err = serde_json::from_str::<ArgumentSchema>(json).unwrap_err();
        assert!(err.to_string().contains("required positional"));
    }

    #[test]
    fn value_coercions() {
        assert_eq!(Value::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::UInt(7).as_i64(), Some(7));
        assert_eq!(Value::Int(-1).as_u64(), None);
        assert!(Value::Null.is_null());
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
    }

    #[test]
    fn value_display_is_canonical() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "1,2"
        );
    }
}
