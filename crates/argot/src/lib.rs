//! Schema-driven command-line argument binding.
//!
//! Given a raw token sequence and an [`ArgumentSchema`] describing the
//! accepted arguments, the engine produces typed values, a structured
//! error, or a cancellation signal in one left-to-right pass.
//!
//! Help rendering, argument discovery, and subcommand routing are
//! deliberately out of scope: collaborators build a schema (in code through
//! [`SchemaBuilder`], or from JSON) and consume the [`ParseOutcome`].
//!
//! ```
//! use argot::{ArgumentDef, ParseOutcome, Parser, SchemaBuilder, ValueKind};
//!
//! let schema = SchemaBuilder::new()
//!     .argument(ArgumentDef::positional("input", 0).required())
//!     .argument(ArgumentDef::named("max-lines").alias("lines").kind(ValueKind::Int))
//!     .build()
//!     .unwrap();
//! let parser = Parser::new(schema).unwrap();
//!
//! let ParseOutcome::Success(args) = parser.parse(["a.txt", "-lines", "5"]) else {
//!     panic!("parse failed");
//! };
//! assert_eq!(args.str_of("input"), Some("a.txt"));
//! assert_eq!(args.int_of("max-lines"), Some(5));
//! ```

mod binder;
mod convert;
mod error;
mod options;
mod parsed;
mod parser;
mod resolver;
mod tokenizer;
mod validate;

pub use convert::{ConversionError, Converter, ConverterRegistry};
pub use error::{ErrorKind, ParseError};
pub use options::{
    Culture, DuplicateArgumentPolicy, ParseOptions, UnknownArgumentAction, UnknownArgumentHook,
};
pub use parsed::{Cancellation, FromParsedArguments, ParseOutcome, ParsedArguments};
pub use parser::Parser;

pub use argot_schema as schema;
pub use argot_schema::{
    ArgumentDef, ArgumentSchema, Arity, CancelMode, ConverterHook, SchemaBuilder, SchemaError,
    ValidatorHook, ValidatorSpec, ValidatorStage, Value, ValueKind,
};
