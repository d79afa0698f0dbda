//! The binding engine: a single left-to-right pass over the token stream,
//! assigning each value to a named or positional slot.
//!
//! Assignment order is strictly token order. The only lookahead is the
//! "does this token name an argument" decision and the whitespace-run
//! absorption for multi-value entries that opt into it.

use std::collections::HashSet;

use argot_schema::{Arity, CancelMode, Value, ValidatorHook};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::options::{DuplicateArgumentPolicy, UnknownArgumentAction};
use crate::parsed::{Cancellation, ParseOutcome, ParsedArguments};
use crate::parser::Parser;
use crate::resolver::Resolution;
use crate::tokenizer;
use crate::validate;

/// Per-entry accumulation state, created fresh for each parse invocation.
#[derive(Debug, Default)]
struct Slot {
    count: u32,
    by_name: bool,
    defaulted: bool,
    single: Option<Value>,
    list: Vec<Value>,
    map: IndexMap<String, Value>,
}

enum Pass {
    Complete(Vec<Slot>),
    Cancelled(Cancellation),
}

pub(crate) fn run(parser: &Parser, tokens: Vec<String>) -> ParseOutcome {
    match bind(parser, &tokens) {
        Ok(Pass::Complete(mut slots)) => match finish(parser, &mut slots) {
            Ok(args) => ParseOutcome::Success(args),
            Err(err) => ParseOutcome::Failed(err),
        },
        Ok(Pass::Cancelled(cancellation)) => ParseOutcome::Cancelled(cancellation),
        Err(err) => ParseOutcome::Failed(err),
    }
}

fn bind(parser: &Parser, tokens: &[String]) -> Result<Pass, ParseError> {
    let schema = parser.schema();
    let options = parser.options();
    let mut slots: Vec<Slot> = (0..schema.len()).map(|_| Slot::default()).collect();
    let mut next_positional = 0usize;
    let mut after_terminator = false;
    let mut i = 0usize;

    while i < tokens.len() {
        let token = tokens[i].as_str();

        if !after_terminator && options.prefix_termination.as_deref() == Some(token) {
            after_terminator = true;
            i += 1;
            continue;
        }

        let name_token = if after_terminator {
            None
        } else {
            tokenizer::classify(token, options)
        };

        let Some(name_token) = name_token else {
            bind_positional(parser, &mut slots, &mut next_positional, token)?;
            i += 1;
            continue;
        };

        let resolution = match parser.table().resolve(&name_token, schema, options) {
            Ok(resolution) => resolution,
            Err(err @ ParseError::UnknownArgument { .. }) => {
                let swallow = options
                    .unknown_argument_hook
                    .as_ref()
                    .is_some_and(|hook| (hook.0)(token) == UnknownArgumentAction::TreatAsValue);
                if !swallow {
                    return Err(err);
                }
                debug!(token, "unknown argument treated as a plain value");
                bind_positional(parser, &mut slots, &mut next_positional, token)?;
                i += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        let token_index = i;
        let mut cancelled_by: Option<usize> = None;

        match resolution {
            Resolution::Switches(indices) => {
                for index in indices {
                    supply_switch(parser, &mut slots, index, None)?;
                    if schema.def(index).cancel != CancelMode::None {
                        cancelled_by = Some(index);
                        break;
                    }
                }
                i += 1;
            }
            Resolution::Single(index) => {
                let def = schema.def(index);
                if def.arity == Arity::Switch {
                    supply_switch(parser, &mut slots, index, name_token.inline)?;
                    i += 1;
                } else {
                    let mut raws: Vec<&str> = Vec::new();
                    if let Some(inline) = name_token.inline {
                        raws.push(inline);
                        i += 1;
                    } else {
                        if !options.allow_whitespace_separator || i + 1 >= tokens.len() {
                            return Err(ParseError::MissingValueForArgument {
                                argument: schema.ident(index).to_string(),
                            });
                        }
                        raws.push(tokens[i + 1].as_str());
                        i += 2;
                    }

                    // Whitespace-separated run: absorb until the next token
                    // that resolves to a declared name, or the terminator.
                    if def.consumes_runs {
                        while i < tokens.len() {
                            let next = tokens[i].as_str();
                            if options.prefix_termination.as_deref() == Some(next) {
                                break;
                            }
                            let is_name = tokenizer::classify(next, options).is_some_and(|t| {
                                parser.table().resolve(&t, schema, options).is_ok()
                            });
                            if is_name {
                                break;
                            }
                            raws.push(next);
                            i += 1;
                        }
                    }

                    supply_values(parser, &mut slots, index, &raws, true)?;
                }
                if schema.def(index).cancel != CancelMode::None {
                    cancelled_by = Some(index);
                }
            }
        }

        if let Some(index) = cancelled_by {
            debug!(argument = schema.ident(index), "argument cancelled parsing");
            return Ok(Pass::Cancelled(Cancellation {
                argument: schema.ident(index).to_string(),
                help_requested: schema.def(index).cancel == CancelMode::StopWithHelp,
                remaining: tokens[token_index..].to_vec(),
            }));
        }
    }

    Ok(Pass::Complete(slots))
}

/// Assign a plain value to the positional entry at the cursor, skipping
/// entries already satisfied by name. A trailing multi-value positional
/// absorbs every remaining plain value, so the cursor never moves past it.
fn bind_positional(
    parser: &Parser,
    slots: &mut [Slot],
    next_positional: &mut usize,
    raw: &str,
) -> Result<(), ParseError> {
    let schema = parser.schema();
    loop {
        let Some(&index) = schema.positional().get(*next_positional) else {
            return Err(ParseError::TooManyPositionalArguments {
                value: raw.to_string(),
            });
        };
        if slots[index].by_name {
            *next_positional += 1;
            continue;
        }
        if schema.def(index).arity.is_multi() {
            return supply_values(parser, slots, index, &[raw], false);
        }
        supply_values(parser, slots, index, &[raw], false)?;
        *next_positional += 1;
        return Ok(());
    }
}

/// A switch assignment: presence alone means true; an inline value must
/// convert to a boolean. Whitespace-separated values never apply.
fn supply_switch(
    parser: &Parser,
    slots: &mut [Slot],
    index: usize,
    inline: Option<&str>,
) -> Result<(), ParseError> {
    let schema = parser.schema();
    let ident = schema.ident(index);

    check_duplicate(parser, &slots[index], ident)?;

    let value = match inline {
        Some(raw) => convert_element(parser, index, raw)?,
        None => Value::Bool(true),
    };
    debug!(argument = ident, "bound switch");
    let slot = &mut slots[index];
    slot.single = Some(value);
    slot.count += 1;
    slot.by_name = true;
    Ok(())
}

fn check_duplicate(parser: &Parser, slot: &Slot, ident: &str) -> Result<(), ParseError> {
    if slot.count == 0 {
        return Ok(());
    }
    match parser.options().duplicate_argument_policy {
        DuplicateArgumentPolicy::Error => Err(ParseError::DuplicateArgument {
            argument: ident.to_string(),
        }),
        DuplicateArgumentPolicy::WarnAndReplace => {
            warn!(argument = ident, "duplicate argument; replacing previous value");
            Ok(())
        }
        DuplicateArgumentPolicy::SilentReplace => Ok(()),
    }
}

fn supply_values(
    parser: &Parser,
    slots: &mut [Slot],
    index: usize,
    raws: &[&str],
    by_name: bool,
) -> Result<(), ParseError> {
    let schema = parser.schema();
    let def = schema.def(index);
    let ident = schema.ident(index);

    // Element separator split; no escaping is supported.
    let elements: Vec<&str> = match def.value_separator {
        Some(sep) => raws.iter().flat_map(|raw| raw.split(sep)).collect(),
        None => raws.to_vec(),
    };

    match def.arity {
        Arity::Single | Arity::Switch => {
            check_duplicate(parser, &slots[index], ident)?;
            if let Some(&element) = elements.first() {
                let value = convert_element(parser, index, element)?;
                slots[index].single = Some(value);
            }
        }
        Arity::MultiValue => {
            for element in &elements {
                let value = convert_element(parser, index, element)?;
                slots[index].list.push(value);
            }
        }
        Arity::Dictionary => {
            let separator = def.key_value_separator.unwrap_or('=');
            for element in &elements {
                validate::run_pre(def, ident, element)?;
                let Some((key, raw_value)) = element.split_once(separator) else {
                    return Err(ParseError::InvalidValueConversion {
                        argument: ident.to_string(),
                        value: element.to_string(),
                        expected: format!("a key{separator}value pair"),
                    });
                };
                let value = convert_raw(parser, index, raw_value)?;
                validate::run_post(def, ident, &value)?;
                let slot = &mut slots[index];
                if slot.map.contains_key(key) && !def.allow_duplicate_keys {
                    return Err(ParseError::ValidationFailed {
                        argument: ident.to_string(),
                        message: format!("duplicate dictionary key '{key}'"),
                    });
                }
                // with duplicates allowed, the last value wins
                slot.map.insert(key.to_string(), value);
            }
        }
    }

    let slot = &mut slots[index];
    slot.count += 1;
    slot.by_name |= by_name;
    debug!(argument = ident, values = elements.len(), "bound argument");
    Ok(())
}

/// Full per-element pipeline: pre-conversion validators, conversion, null
/// check, post-conversion validators.
fn convert_element(parser: &Parser, index: usize, raw: &str) -> Result<Value, ParseError> {
    let def = parser.schema().def(index);
    let ident = parser.schema().ident(index);
    validate::run_pre(def, ident, raw)?;
    let value = convert_raw(parser, index, raw)?;
    validate::run_post(def, ident, &value)?;
    Ok(value)
}

/// Conversion chain: the entry's custom converter, then the registry
/// (override or built-in). A null result is rejected unless allowed.
fn convert_raw(parser: &Parser, index: usize, raw: &str) -> Result<Value, ParseError> {
    let def = parser.schema().def(index);
    let ident = parser.schema().ident(index);
    let value = match &def.converter {
        Some(hook) => (hook.0)(raw).map_err(|expected| ParseError::InvalidValueConversion {
            argument: ident.to_string(),
            value: raw.to_string(),
            expected,
        })?,
        None => parser
            .converters()
            .convert(def.value_kind, raw, &parser.options().culture)
            .map_err(|_| ParseError::InvalidValueConversion {
                argument: ident.to_string(),
                value: raw.to_string(),
                expected: def.describe_value().to_string(),
            })?,
    };
    if value.is_null() && !def.allows_null {
        return Err(ParseError::NullArgumentValue {
            argument: ident.to_string(),
        });
    }
    Ok(value)
}

/// Post-pass checks and assembly: required arguments, defaults, value-count
/// bounds, cross-argument constraints, then the bound value set.
fn finish(parser: &Parser, slots: &mut [Slot]) -> Result<ParsedArguments, ParseError> {
    let schema = parser.schema();

    // Positional entries first, in position order, so the earliest missing
    // required argument is the one reported.
    for &index in schema.positional() {
        if schema.def(index).required && slots[index].count == 0 {
            return Err(ParseError::MissingRequiredArgument {
                argument: schema.ident(index).to_string(),
            });
        }
    }
    for (index, def) in schema.defs().iter().enumerate() {
        if def.position.is_none() && def.required && slots[index].count == 0 {
            return Err(ParseError::MissingRequiredArgument {
                argument: schema.ident(index).to_string(),
            });
        }
    }

    for (index, def) in schema.defs().iter().enumerate() {
        if slots[index].count == 0 && !def.required {
            if let Some(default) = &def.default_value {
                if !default.is_null() {
                    slots[index].single = Some(default.clone());
                    slots[index].defaulted = true;
                }
            }
        }
    }

    for (index, def) in schema.defs().iter().enumerate() {
        if slots[index].count == 0 || !def.arity.is_multi() {
            continue;
        }
        let count = match def.arity {
            Arity::Dictionary => slots[index].map.len(),
            _ => slots[index].list.len(),
        };
        validate::run_value_count(def, schema.ident(index), count)?;
    }

    for (index, def) in schema.defs().iter().enumerate() {
        validate::run_cross_argument(def, schema.ident(index), slots[index].count > 0, |name| {
            schema.find(name).is_some_and(|i| slots[i].count > 0)
        })?;
    }

    let mut values: IndexMap<String, Value> = IndexMap::new();
    let mut supplied: HashSet<String> = HashSet::new();
    let mut defaulted: HashSet<String> = HashSet::new();

    for (index, def) in schema.defs().iter().enumerate() {
        let ident = schema.ident(index).to_string();
        let slot = &mut slots[index];
        let value = if slot.defaulted {
            slot.single.take()
        } else if slot.count == 0 {
            None
        } else {
            match def.arity {
                Arity::Single | Arity::Switch => slot.single.take(),
                Arity::MultiValue => Some(Value::List(std::mem::take(&mut slot.list))),
                Arity::Dictionary => Some(Value::Map(std::mem::take(&mut slot.map))),
            }
        };
        let Some(value) = value else {
            continue;
        };
        if slot.count > 0 {
            supplied.insert(ident.clone());
        }
        if slot.defaulted {
            defaulted.insert(ident.clone());
        }
        values.insert(ident, value);
    }

    for (index, def) in schema.defs().iter().enumerate() {
        for hook in &def.validator_hooks {
            if let ValidatorHook::PostParse(f) = hook {
                f(&values).map_err(|message| ParseError::ValidationFailed {
                    argument: schema.ident(index).to_string(),
                    message,
                })?;
            }
        }
    }

    Ok(ParsedArguments::new(values, supplied, defaulted))
}
