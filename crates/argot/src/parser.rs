use argot_schema::{ArgumentSchema, SchemaError};
use tracing::debug;

use crate::binder;
use crate::convert::ConverterRegistry;
use crate::options::ParseOptions;
use crate::parsed::ParseOutcome;
use crate::resolver::NameTable;

/// A schema-driven argument parser.
///
/// Construction builds the name lookup tables and rejects schemas whose
/// names collide under the configured case policy, so `parse` itself never
/// fails for schema reasons. The parser is immutable and can be reused for
/// any number of parse invocations; each invocation gets its own state.
#[derive(Debug, Clone)]
pub struct Parser {
    schema: ArgumentSchema,
    options: ParseOptions,
    converters: ConverterRegistry,
    table: NameTable,
}

impl Parser {
    pub fn new(schema: ArgumentSchema) -> Result<Self, SchemaError> {
        Self::with_options(schema, ParseOptions::default())
    }

    pub fn with_options(schema: ArgumentSchema, options: ParseOptions) -> Result<Self, SchemaError> {
        let table = NameTable::build(&schema, &options)?;
        Ok(Parser {
            schema,
            options,
            converters: ConverterRegistry::new(),
            table,
        })
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Register converter overrides before parsing.
    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    pub(crate) fn table(&self) -> &NameTable {
        &self.table
    }

    /// Parse an explicit token sequence.
    pub fn parse<I, S>(&self, tokens: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        debug!(tokens = tokens.len(), "starting parse");
        binder::run(self, tokens)
    }

    /// Parse the process argument vector (skipping the program name).
    pub fn parse_env(&self) -> ParseOutcome {
        self.parse(std::env::args().skip(1))
    }
}
