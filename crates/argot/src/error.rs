use thiserror::Error;

/// Tag identifying an error's kind without destructuring the variant.
///
/// Collaborators that render messages can match on this and on
/// [`ParseError::argument`] without re-deriving parse state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownArgument,
    AmbiguousPrefixAlias,
    MissingValueForArgument,
    InvalidValueConversion,
    ValidationFailed,
    DuplicateArgument,
    MissingRequiredArgument,
    TooManyPositionalArguments,
    NullArgumentValue,
}

/// A terminal parse failure. The engine raises the first error encountered
/// and stops; it never collects multiple errors in one invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unknown argument '{token}'")]
    UnknownArgument { token: String },
    #[error("argument prefix '{prefix}' is ambiguous: could be {}", .candidates.join(", "))]
    AmbiguousPrefixAlias {
        prefix: String,
        candidates: Vec<String>,
    },
    #[error("missing value for argument '{argument}'")]
    MissingValueForArgument { argument: String },
    #[error("invalid value '{value}' for argument '{argument}': expected {expected}")]
    InvalidValueConversion {
        argument: String,
        value: String,
        expected: String,
    },
    #[error("invalid value for argument '{argument}': {message}")]
    ValidationFailed { argument: String, message: String },
    #[error("argument '{argument}' was supplied more than once")]
    DuplicateArgument { argument: String },
    #[error("missing required argument '{argument}'")]
    MissingRequiredArgument { argument: String },
    #[error("unexpected positional value '{value}'")]
    TooManyPositionalArguments { value: String },
    #[error("argument '{argument}' does not accept a null value")]
    NullArgumentValue { argument: String },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnknownArgument { .. } => ErrorKind::UnknownArgument,
            ParseError::AmbiguousPrefixAlias { .. } => ErrorKind::AmbiguousPrefixAlias,
            ParseError::MissingValueForArgument { .. } => ErrorKind::MissingValueForArgument,
            ParseError::InvalidValueConversion { .. } => ErrorKind::InvalidValueConversion,
            ParseError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            ParseError::DuplicateArgument { .. } => ErrorKind::DuplicateArgument,
            ParseError::MissingRequiredArgument { .. } => ErrorKind::MissingRequiredArgument,
            ParseError::TooManyPositionalArguments { .. } => {
                ErrorKind::TooManyPositionalArguments
            }
            ParseError::NullArgumentValue { .. } => ErrorKind::NullArgumentValue,
        }
    }

    /// The offending argument's canonical name, when the error is tied to a
    /// declared argument rather than a raw token.
    pub fn argument(&self) -> Option<&str> {
        match self {
            ParseError::MissingValueForArgument { argument }
            | ParseError::InvalidValueConversion { argument, .. }
            | ParseError::ValidationFailed { argument, .. }
            | ParseError::DuplicateArgument { argument }
            | ParseError::MissingRequiredArgument { argument }
            | ParseError::NullArgumentValue { argument } => Some(argument),
            ParseError::UnknownArgument { .. }
            | ParseError::AmbiguousPrefixAlias { .. }
            | ParseError::TooManyPositionalArguments { .. } => None,
        }
    }
}
