//! Validation pipeline stages.
//!
//! Pre-conversion validators see the raw string element; post-conversion
//! validators see the typed value; post-parse validators run after the whole
//! token stream is consumed. Within a stage, declarative specs run before
//! custom hooks, each in declaration order, and the first failure wins.

use argot_schema::{ArgumentDef, Value, ValidatorHook, ValidatorSpec, ValidatorStage};

use crate::error::ParseError;

fn failed(ident: &str, message: String) -> ParseError {
    ParseError::ValidationFailed {
        argument: ident.to_string(),
        message,
    }
}

/// Run pre-conversion validators against a raw element value.
pub(crate) fn run_pre(def: &ArgumentDef, ident: &str, raw: &str) -> Result<(), ParseError> {
    for spec in &def.validators {
        if spec.stage() != ValidatorStage::PreConversion {
            continue;
        }
        match spec {
            ValidatorSpec::NonEmpty => {
                if raw.is_empty() {
                    return Err(failed(ident, "value must not be empty".into()));
                }
            }
            ValidatorSpec::StringLength { min, max } => {
                let len = raw.chars().count();
                if let Some(min) = min {
                    if len < *min {
                        return Err(failed(
                            ident,
                            format!("value must be at least {min} characters"),
                        ));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        return Err(failed(
                            ident,
                            format!("value must be at most {max} characters"),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    for hook in &def.validator_hooks {
        if let ValidatorHook::PreConversion(f) = hook {
            f(raw).map_err(|message| failed(ident, message))?;
        }
    }
    Ok(())
}

/// Run post-conversion validators against a converted value. Null values
/// only answer to `NotNull`; bounds and membership checks pass them through.
pub(crate) fn run_post(def: &ArgumentDef, ident: &str, value: &Value) -> Result<(), ParseError> {
    for spec in &def.validators {
        if spec.stage() != ValidatorStage::PostConversion {
            continue;
        }
        match spec {
            ValidatorSpec::NotNull => {
                if value.is_null() {
                    return Err(failed(ident, "value must not be null".into()));
                }
            }
            ValidatorSpec::Range { min, max } if !value.is_null() => {
                let Some(number) = value.as_f64() else {
                    return Err(failed(ident, "value is not numeric".into()));
                };
                if let Some(min) = min {
                    if number < *min {
                        return Err(failed(ident, format!("value must be at least {min}")));
                    }
                }
                if let Some(max) = max {
                    if number > *max {
                        return Err(failed(ident, format!("value must be at most {max}")));
                    }
                }
            }
            ValidatorSpec::OneOf { values } if !value.is_null() => {
                let canonical = value.to_string();
                if !values.iter().any(|v| v == &canonical) {
                    return Err(failed(
                        ident,
                        format!("value must be one of: {}", values.join(", ")),
                    ));
                }
            }
            _ => {}
        }
    }
    for hook in &def.validator_hooks {
        if let ValidatorHook::PostConversion(f) = hook {
            f(value).map_err(|message| failed(ident, message))?;
        }
    }
    Ok(())
}

/// Check a supplied multi-value/dictionary entry's value-count bounds.
pub(crate) fn run_value_count(
    def: &ArgumentDef,
    ident: &str,
    count: usize,
) -> Result<(), ParseError> {
    for spec in &def.validators {
        if let ValidatorSpec::ValueCount { min, max } = spec {
            if let Some(min) = min {
                if count < *min {
                    return Err(failed(ident, format!("expected at least {min} values")));
                }
            }
            if let Some(max) = max {
                if count > *max {
                    return Err(failed(ident, format!("expected at most {max} values")));
                }
            }
        }
    }
    Ok(())
}

/// Cross-argument constraints, evaluated against the supplied-argument set.
/// `Requires`/`Prohibits` are conditional on their owner having been
/// supplied; `RequiresAny` is unconditional.
pub(crate) fn run_cross_argument(
    def: &ArgumentDef,
    ident: &str,
    owner_supplied: bool,
    supplied: impl Fn(&str) -> bool,
) -> Result<(), ParseError> {
    for spec in &def.validators {
        match spec {
            ValidatorSpec::Requires { arguments } if owner_supplied => {
                for target in arguments {
                    if !supplied(target) {
                        return Err(failed(
                            ident,
                            format!("argument '{ident}' requires '{target}'"),
                        ));
                    }
                }
            }
            ValidatorSpec::Prohibits { arguments } if owner_supplied => {
                for target in arguments {
                    if supplied(target) {
                        return Err(failed(
                            ident,
                            format!("argument '{ident}' cannot be used with '{target}'"),
                        ));
                    }
                }
            }
            ValidatorSpec::RequiresAny { arguments } => {
                if !arguments.iter().any(|target| supplied(target)) {
                    return Err(failed(
                        ident,
                        format!(
                            "at least one of {} must be supplied",
                            arguments.join(", ")
                        ),
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot_schema::{ArgumentDef, ValueKind};
    use std::sync::Arc;

    #[test]
    fn pre_conversion_specs_run_in_order() {
        let def = ArgumentDef::named("tag")
            .validator(ValidatorSpec::NonEmpty)
            .validator(ValidatorSpec::StringLength {
                min: Some(2),
                max: Some(4),
            });

        assert!(run_pre(&def, "tag", "ab").is_ok());
        let err = run_pre(&def, "tag", "").unwrap_err();
        // empty fails NonEmpty first, not StringLength
        assert_eq!(
            err,
            ParseError::ValidationFailed {
                argument: "tag".into(),
                message: "value must not be empty".into()
            }
        );
        assert!(run_pre(&def, "tag", "abcde").is_err());
    }

    #[test]
    fn range_checks_converted_value() {
        let def = ArgumentDef::named("count")
            .kind(ValueKind::Int)
            .validator(ValidatorSpec::Range {
                min: Some(1.0),
                max: None,
            });
        assert!(run_post(&def, "count", &Value::Int(1)).is_ok());
        assert!(run_post(&def, "count", &Value::Int(0)).is_err());
    }

    #[test]
    fn one_of_compares_canonical_form() {
        let def = ArgumentDef::named("format").validator(ValidatorSpec::OneOf {
            values: vec!["plain".into(), "json".into()],
        });
        assert!(run_post(&def, "format", &Value::String("json".into())).is_ok());
        let err = run_post(&def, "format", &Value::String("xml".into())).unwrap_err();
        assert!(err.to_string().contains("plain, json"));
    }

    #[test]
    fn null_skips_bounds_but_not_not_null() {
        let bounded = ArgumentDef::named("n")
            .kind(ValueKind::Int)
            .allows_null()
            .validator(ValidatorSpec::Range {
                min: Some(0.0),
                max: None,
            });
        assert!(run_post(&bounded, "n", &Value::Null).is_ok());

        let not_null = ArgumentDef::named("n").validator(ValidatorSpec::NotNull);
        assert!(run_post(&not_null, "n", &Value::Null).is_err());
    }

    #[test]
    fn custom_hooks_run_after_specs() {
        let def = ArgumentDef::named("word")
            .validator(ValidatorSpec::NonEmpty)
            .validate_with(ValidatorHook::PreConversion(Arc::new(|raw| {
                if raw.contains(' ') {
                    Err("value may not contain spaces".into())
                } else {
                    Ok(())
                }
            })));
        assert!(run_pre(&def, "word", "ok").is_ok());
        let err = run_pre(&def, "word", "not ok").unwrap_err();
        assert!(err.to_string().contains("spaces"));
    }
}
