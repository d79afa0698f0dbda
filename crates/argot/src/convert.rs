//! Value conversion: raw token string to typed [`Value`].
//!
//! Resolution order per element is an explicit chain: the argument's custom
//! converter (if any), then a registered override for the value kind, then
//! the built-in converter. Built-ins parse with the invariant [`Culture`]
//! unless the caller supplies another one.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use argot_schema::{Value, ValueKind};

use crate::options::Culture;

/// A conversion failure; `expected` is the type hint a collaborator can use
/// to build a message.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    pub expected: String,
}

impl ConversionError {
    pub fn new(expected: impl Into<String>) -> Self {
        ConversionError {
            expected: expected.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}", self.expected)
    }
}

pub type Converter = Arc<dyn Fn(&str, &Culture) -> Result<Value, ConversionError> + Send + Sync>;

/// Maps value kinds to converters. Registered overrides shadow the
/// built-ins for their kind.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    overrides: HashMap<ValueKind, Converter>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: ValueKind, f: F)
    where
        F: Fn(&str, &Culture) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.overrides.insert(kind, Arc::new(f));
    }

    pub fn convert(
        &self,
        kind: ValueKind,
        raw: &str,
        culture: &Culture,
    ) -> Result<Value, ConversionError> {
        if let Some(converter) = self.overrides.get(&kind) {
            return converter(raw, culture);
        }
        convert_builtin(kind, raw, culture)
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn convert_builtin(kind: ValueKind, raw: &str, culture: &Culture) -> Result<Value, ConversionError> {
    match kind {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| ConversionError::new(ValueKind::Bool.describe())),
        ValueKind::Int => strip_groups(raw, culture)
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ConversionError::new(ValueKind::Int.describe())),
        ValueKind::Uint => strip_groups(raw, culture)
            .parse::<u64>()
            .map(Value::UInt)
            .map_err(|_| ConversionError::new(ValueKind::Uint.describe())),
        ValueKind::Float => normalize_decimal(&strip_groups(raw, culture), culture)
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ConversionError::new(ValueKind::Float.describe())),
        ValueKind::Path => Ok(Value::Path(PathBuf::from(raw))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn strip_groups(raw: &str, culture: &Culture) -> String {
    match culture.group_separator {
        Some(sep) => raw.chars().filter(|&c| c != sep).collect(),
        None => raw.to_string(),
    }
}

fn normalize_decimal(raw: &str, culture: &Culture) -> String {
    if culture.decimal_separator == '.' {
        raw.to_string()
    } else {
        raw.replace(culture.decimal_separator, ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(kind: ValueKind, raw: &str) -> Result<Value, ConversionError> {
        ConverterRegistry::new().convert(kind, raw, &Culture::invariant())
    }

    #[test]
    fn builtin_conversions() {
        assert_eq!(convert(ValueKind::String, "abc"), Ok(Value::String("abc".into())));
        assert_eq!(convert(ValueKind::Bool, "TRUE"), Ok(Value::Bool(true)));
        assert_eq!(convert(ValueKind::Bool, "0"), Ok(Value::Bool(false)));
        assert_eq!(convert(ValueKind::Int, "-42"), Ok(Value::Int(-42)));
        assert_eq!(convert(ValueKind::Uint, "42"), Ok(Value::UInt(42)));
        assert_eq!(convert(ValueKind::Float, "2.5"), Ok(Value::Float(2.5)));
        assert_eq!(
            convert(ValueKind::Path, "a/b.txt"),
            Ok(Value::Path(PathBuf::from("a/b.txt")))
        );
    }

    #[test]
    fn conversion_failures_carry_type_hint() {
        let err = convert(ValueKind::Int, "five").unwrap_err();
        assert_eq!(err.expected, "integer");
        assert!(convert(ValueKind::Uint, "-1").is_err());
        assert!(convert(ValueKind::Bool, "maybe").is_err());
        assert!(convert(ValueKind::Float, "").is_err());
    }

    #[test]
    fn culture_controls_numeric_shape() {
        let german = Culture {
            decimal_separator: ',',
            group_separator: Some('.'),
        };
        let registry = ConverterRegistry::new();
        assert_eq!(
            registry.convert(ValueKind::Float, "1.234,5", &german),
            Ok(Value::Float(1234.5))
        );
        assert_eq!(
            registry.convert(ValueKind::Int, "1.234", &german),
            Ok(Value::Int(1234))
        );
        // invariant culture rejects grouped input
        assert!(convert(ValueKind::Int, "1,234").is_err());
    }

    #[test]
    fn registered_override_shadows_builtin(){
        let mut registry = ConverterRegistry::new();
        registry.register(ValueKind::Int, |raw, _| {
            raw.trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| ConversionError::new("integer"))
        });
        assert_eq!(
            registry.convert(ValueKind::Int, " 7 ", &Culture::invariant()),
            Ok(Value::Int(7))
        );
    }

    #[test]
    fn scalar_values_round_trip_through_display() {
        for value in [
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(-17),
            Value::UInt(99),
            Value::Float(0.25),
            Value::String("plain".into()),
            Value::Path(PathBuf::from("x/y")),
        ] {
            let kind = match &value {
                Value::Bool(_) => ValueKind::Bool,
                Value::Int(_) => ValueKind::Int,
                Value::UInt(_) => ValueKind::Uint,
                Value::Float(_) => ValueKind::Float,
                Value::String(_) => ValueKind::String,
                Value::Path(_) => ValueKind::Path,
                _ => unreachable!(),
            };
            assert_eq!(convert(kind, &value.to_string()), Ok(value));
        }
    }
}
