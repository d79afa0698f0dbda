//! Name resolution: candidate name to schema entry.
//!
//! Lookup tables are built once per parser from the schema and the case
//! policy; resolution itself is pure and shares nothing with parse state.

use std::collections::HashMap;

use argot_schema::{ArgumentSchema, Arity, SchemaError};

use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::tokenizer::{NameToken, PrefixKind};

#[derive(Debug, Clone)]
struct LongEntry {
    folded: String,
    display: String,
    index: usize,
}

/// Case-folded lookup tables for every declared name and alias.
#[derive(Debug, Clone)]
pub(crate) struct NameTable {
    /// Exact lookup over long names (single mode: all names).
    exact: HashMap<String, usize>,
    /// Short names and short aliases (long/short mode only).
    short: HashMap<String, usize>,
    /// Scan list for prefix aliasing, in declaration order.
    entries: Vec<LongEntry>,
    case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution {
    Single(usize),
    /// A combined short-switch token, one entry per character.
    Switches(Vec<usize>),
}

impl NameTable {
    /// Build the tables, rejecting names that collide under the configured
    /// case policy (exact duplicates were already rejected at schema build).
    pub(crate) fn build(
        schema: &ArgumentSchema,
        options: &ParseOptions,
    ) -> Result<Self, SchemaError> {
        let mut table = NameTable {
            exact: HashMap::new(),
            short: HashMap::new(),
            entries: Vec::new(),
            case_sensitive: options.case_sensitive_names,
        };

        for (index, def) in schema.defs().iter().enumerate() {
            for name in def.name.iter().chain(def.aliases.iter()) {
                table.insert_long(name, index)?;
            }
            for &short in def.short.iter().chain(def.short_aliases.iter()) {
                let name = short.to_string();
                if options.long_short_mode {
                    table.insert_short(&name, index)?;
                } else {
                    table.insert_long(&name, index)?;
                }
            }
        }

        Ok(table)
    }

    fn fold(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    fn insert_long(&mut self, name: &str, index: usize) -> Result<(), SchemaError> {
        let folded = self.fold(name);
        if let Some(&prev) = self.exact.get(&folded) {
            if prev != index {
                return Err(SchemaError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }
        self.exact.insert(folded.clone(), index);
        self.entries.push(LongEntry {
            folded,
            display: name.to_string(),
            index,
        });
        Ok(())
    }

    fn insert_short(&mut self, name: &str, index: usize) -> Result<(), SchemaError> {
        let folded = self.fold(name);
        if let Some(&prev) = self.short.get(&folded) {
            if prev != index {
                return Err(SchemaError::DuplicateName {
                    name: name.to_string(),
                });
            }
        }
        self.short.insert(folded, index);
        Ok(())
    }

    /// Resolve a name token to its schema entry (or entries, for a combined
    /// short-switch token).
    pub(crate) fn resolve(
        &self,
        token: &NameToken<'_>,
        schema: &ArgumentSchema,
        options: &ParseOptions,
    ) -> Result<Resolution, ParseError> {
        let folded = self.fold(token.name);

        match token.kind {
            PrefixKind::Plain | PrefixKind::Long => {
                if let Some(&index) = self.exact.get(&folded) {
                    return Ok(Resolution::Single(index));
                }
                if options.auto_prefix_aliases && !folded.is_empty() {
                    if let Some(resolution) = self.resolve_prefix(token, &folded)? {
                        return Ok(resolution);
                    }
                }
            }
            PrefixKind::Short => {
                if let Some(&index) = self.short.get(&folded) {
                    return Ok(Resolution::Single(index));
                }
                if token.inline.is_none() && token.name.chars().count() > 1 {
                    if let Some(resolution) = self.resolve_combined(token, schema) {
                        return Ok(resolution);
                    }
                }
            }
        }

        Err(ParseError::UnknownArgument {
            token: token.original.to_string(),
        })
    }

    /// Unique-prefix aliasing over declared long names.
    fn resolve_prefix(
        &self,
        token: &NameToken<'_>,
        folded: &str,
    ) -> Result<Option<Resolution>, ParseError> {
        let hits: Vec<&LongEntry> = self
            .entries
            .iter()
            .filter(|e| e.folded.starts_with(folded) && e.folded != folded)
            .collect();

        let mut indices: Vec<usize> = hits.iter().map(|e| e.index).collect();
        indices.sort_unstable();
        indices.dedup();

        match indices.len() {
            0 => Ok(None),
            1 => Ok(Some(Resolution::Single(indices[0]))),
            _ => {
                let mut candidates: Vec<String> =
                    hits.iter().map(|e| e.display.clone()).collect();
                candidates.sort();
                Err(ParseError::AmbiguousPrefixAlias {
                    prefix: token.name.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Combined-switch expansion: every character must name a distinct
    /// switch; otherwise the whole token stays unresolved.
    fn resolve_combined(
        &self,
        token: &NameToken<'_>,
        schema: &ArgumentSchema,
    ) -> Option<Resolution> {
        let mut indices = Vec::new();
        for c in token.name.chars() {
            let folded = self.fold(&c.to_string());
            let &index = self.short.get(&folded)?;
            if schema.def(index).arity != Arity::Switch || indices.contains(&index) {
                return None;
            }
            indices.push(index);
        }
        Some(Resolution::Switches(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::classify;
    use argot_schema::{ArgumentDef, SchemaBuilder};

    fn schema() -> ArgumentSchema {
        SchemaBuilder::new()
            .argument(ArgumentDef::named("file-name").short('f'))
            .argument(ArgumentDef::named("file-path"))
            .argument(ArgumentDef::switch("verbose").short('v'))
            .argument(ArgumentDef::switch("quiet").short('q'))
            .build()
            .unwrap()
    }

    fn resolve(token: &str, options: &ParseOptions) -> Result<Resolution, ParseError> {
        let schema = schema();
        let table = NameTable::build(&schema, options).unwrap();
        let name_token = classify(token, options).expect("token should classify as a name");
        table.resolve(&name_token, &schema, options)
    }

    #[test]
    fn exact_match_beats_prefix_alias() {
        let options = ParseOptions::default();
        assert_eq!(resolve("--file-name", &options), Ok(Resolution::Single(0)));
        assert_eq!(resolve("-f", &options), Ok(Resolution::Single(0)));
    }

    #[test]
    fn names_fold_case_by_default() {
        let options = ParseOptions::default();
        assert_eq!(resolve("--File-Name", &options), Ok(Resolution::Single(0)));

        let sensitive = ParseOptions::default().case_sensitive();
        assert!(matches!(
            resolve("--File-Name", &sensitive),
            Err(ParseError::UnknownArgument { .. })
        ));
    }

    #[test]
    fn unique_prefix_resolves() {
        let options = ParseOptions::default();
        assert_eq!(resolve("--file-n", &options), Ok(Resolution::Single(0)));
        assert_eq!(resolve("--file-p", &options), Ok(Resolution::Single(1)));
    }

    #[test]
    fn ambiguous_prefix_enumerates_candidates() {
        let options = ParseOptions::default();
        let err = resolve("--file-", &options).unwrap_err();
        assert_eq!(
            err,
            ParseError::AmbiguousPrefixAlias {
                prefix: "file-".into(),
                candidates: vec!["file-name".into(), "file-path".into()],
            }
        );
    }

    #[test]
    fn prefix_aliasing_can_be_disabled() {
        let options = ParseOptions::default().prefix_aliases(false);
        assert!(matches!(
            resolve("--file-n", &options),
            Err(ParseError::UnknownArgument { .. })
        ));
    }

    #[test]
    fn combined_switches_expand_in_long_short_mode() {
        let options = ParseOptions::default().long_short_mode();
        assert_eq!(
            resolve("-vq", &options),
            Ok(Resolution::Switches(vec![2, 3]))
        );
    }

    #[test]
    fn combined_rejects_non_switch_character() {
        let options = ParseOptions::default().long_short_mode();
        // 'f' takes a value, so the whole token is one unknown token
        assert_eq!(
            resolve("-vf", &options),
            Err(ParseError::UnknownArgument {
                token: "-vf".into()
            })
        );
    }
}
