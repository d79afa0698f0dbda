//! `argot`: bind a token list against a schema JSON file and print the
//! bound values as JSON.
//!
//! The binary parses its own argument vector with the engine it ships.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use argot::{
    ArgumentDef, Arity, CancelMode, ParseOptions, ParseOutcome, ParsedArguments, Parser,
    SchemaBuilder, ValueKind,
};
use argot_schema::ArgumentSchema;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str =
    "usage: argot <schema.json> [-pretty] [-long-short] [-case-sensitive] [-version] [--] [tokens...]";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let own = own_parser()?;
    let args = match own.parse_env() {
        ParseOutcome::Success(args) => args,
        ParseOutcome::Cancelled(_) => {
            println!("argot {}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::SUCCESS);
        }
        ParseOutcome::Failed(err) => {
            eprintln!("error: {err}");
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let schema_path = PathBuf::from(args.str_of("schema").context("schema path missing")?);
    let contents = fs::read_to_string(&schema_path)
        .with_context(|| format!("failed to read schema: {}", schema_path.display()))?;
    let schema: ArgumentSchema = serde_json::from_str(&contents)
        .with_context(|| format!("invalid schema JSON: {}", schema_path.display()))?;
    debug!(arguments = schema.len(), "loaded schema");

    let mut options = ParseOptions::default();
    if args.bool_of("long-short") {
        options = options.long_short_mode();
    }
    if args.bool_of("case-sensitive") {
        options = options.case_sensitive();
    }

    let parser = Parser::with_options(schema, options)?;
    let tokens: Vec<String> = args
        .list_of("tokens")
        .unwrap_or(&[])
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    let pretty = args.bool_of("pretty");
    match parser.parse(tokens) {
        ParseOutcome::Success(bound) => {
            print_bound(&bound, pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        ParseOutcome::Cancelled(cancellation) => {
            let payload = json!({
                "cancelled": {
                    "argument": cancellation.argument,
                    "help-requested": cancellation.help_requested,
                    "remaining": cancellation.remaining,
                }
            });
            print_json(&payload, pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        ParseOutcome::Failed(err) => {
            eprintln!("error: {err}");
            Ok(ExitCode::from(2))
        }
    }
}

/// The binary's own argument schema. Everything after `--` is handed to the
/// user schema untouched.
fn own_parser() -> Result<Parser> {
    let schema = SchemaBuilder::new()
        .argument(
            ArgumentDef::positional("schema", 0)
                .required()
                .kind(ValueKind::Path),
        )
        .argument(ArgumentDef::positional("tokens", 1).arity(Arity::MultiValue))
        .argument(ArgumentDef::switch("pretty").short('p'))
        .argument(ArgumentDef::switch("long-short"))
        .argument(ArgumentDef::switch("case-sensitive"))
        .argument(ArgumentDef::switch("version").cancel(CancelMode::Stop))
        .build()?;
    let options = ParseOptions::default().prefix_termination("--");
    Ok(Parser::with_options(schema, options)?)
}

fn print_bound(bound: &ParsedArguments, pretty: bool) -> Result<()> {
    print_json(&bound.to_json(), pretty)
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
