//! Parse results: the bound value set, the cancellation signal, and the
//! three-way outcome the caller matches on.

use std::collections::HashSet;

use argot_schema::Value;
use indexmap::IndexMap;

use crate::error::ParseError;

/// Terminal state of one parse invocation. Cancellation is not an error:
/// callers can distinguish all three outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Success(ParsedArguments),
    Cancelled(Cancellation),
    Failed(ParseError),
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ParseOutcome::Cancelled(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ParseOutcome::Failed(_))
    }

    pub fn success(self) -> Option<ParsedArguments> {
        match self {
            ParseOutcome::Success(args) => Some(args),
            _ => None,
        }
    }

    pub fn cancellation(self) -> Option<Cancellation> {
        match self {
            ParseOutcome::Cancelled(c) => Some(c),
            _ => None,
        }
    }

    pub fn failure(self) -> Option<ParseError> {
        match self {
            ParseOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Parsing stopped deliberately before consuming all input.
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    /// Canonical name of the argument that cancelled parsing.
    pub argument: String,
    pub help_requested: bool,
    /// Unconsumed tokens, starting at the cancelling token's position.
    pub remaining: Vec<String>,
}

/// The bound, validated value set. Population order is unspecified;
/// consumers must look values up by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedArguments {
    values: IndexMap<String, Value>,
    supplied: HashSet<String>,
    defaulted: HashSet<String>,
}

impl ParsedArguments {
    pub(crate) fn new(
        values: IndexMap<String, Value>,
        supplied: HashSet<String>,
        defaulted: HashSet<String>,
    ) -> Self {
        ParsedArguments {
            values,
            supplied,
            defaulted,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int_of(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn uint_of(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn float_of(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Switch accessor: false when the switch was never supplied.
    pub fn bool_of(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn list_of(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn map_of(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        self.get(name).and_then(Value::as_map)
    }

    /// Whether the argument received a value from the token stream (as
    /// opposed to a default, or nothing).
    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains(name)
    }

    pub fn is_defaulted(&self, name: &str) -> bool {
        self.defaulted.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Bound values as a JSON object, for collaborators that render results.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }

    /// Map the bound set into a caller-defined structure.
    pub fn bind<T: FromParsedArguments>(&self) -> Result<T, ParseError> {
        T::from_parsed(self)
    }
}

/// Injection seam for the result assembler: implement this to populate your
/// own argument struct from the bound value set.
pub trait FromParsedArguments: Sized {
    fn from_parsed(args: &ParsedArguments) -> Result<Self, ParseError>;
}
