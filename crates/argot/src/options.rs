use std::fmt;
use std::sync::Arc;

/// Numeric formatting conventions used by the built-in converters.
///
/// Defaults to an invariant culture so parsing is deterministic across
/// machines; the host's ambient locale is never consulted. A culture is
/// threaded explicitly through each parse invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Culture {
    /// Character accepted as the decimal point in floating-point values.
    pub decimal_separator: char,
    /// Digit-group separator stripped from numeric values before parsing,
    /// e.g. `,` for `1,000`. None means grouped input is rejected.
    pub group_separator: Option<char>,
}

impl Culture {
    pub const fn invariant() -> Self {
        Culture {
            decimal_separator: '.',
            group_separator: None,
        }
    }
}

impl Default for Culture {
    fn default() -> Self {
        Culture::invariant()
    }
}

/// What happens when a non-multi-value argument is supplied twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateArgumentPolicy {
    #[default]
    Error,
    /// The new value replaces the old; a warning is emitted via `tracing`.
    WarnAndReplace,
    SilentReplace,
}

/// Verdict of the unknown-argument escape hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownArgumentAction {
    /// Fail the parse with `UnknownArgument`.
    Reject,
    /// Swallow the token: bind it as a plain positional value.
    TreatAsValue,
}

/// Caller-supplied hook consulted when a name-looking token resolves to no
/// declared argument.
#[derive(Clone)]
pub struct UnknownArgumentHook(pub Arc<dyn Fn(&str) -> UnknownArgumentAction + Send + Sync>);

impl UnknownArgumentHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> UnknownArgumentAction + Send + Sync + 'static,
    {
        UnknownArgumentHook(Arc::new(f))
    }
}

impl fmt::Debug for UnknownArgumentHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnknownArgumentHook")
    }
}

/// Engine configuration. Concrete prefix/separator syntax is configuration,
/// not contract; the defaults give conventional `-name` / `--name` behavior.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Prefixes marking a name token. In single mode this is the only
    /// prefix set; in long/short mode it marks short names.
    pub name_prefixes: Vec<String>,
    /// Long-name prefixes, consulted only in long/short mode.
    pub long_name_prefixes: Vec<String>,
    /// Characters splitting a name token into name + inline value.
    pub name_value_separators: Vec<char>,
    /// Whether `-name value` (two tokens) is accepted in addition to
    /// `-name:value`.
    pub allow_whitespace_separator: bool,
    pub case_sensitive_names: bool,
    /// Resolve an unambiguous shortened form of a declared name.
    pub auto_prefix_aliases: bool,
    pub duplicate_argument_policy: DuplicateArgumentPolicy,
    pub culture: Culture,
    /// Dual-prefix mode with combined short switches (`-abc`).
    pub long_short_mode: bool,
    /// Terminator token after which every token is a plain value.
    /// Disabled when `None`.
    pub prefix_termination: Option<String>,
    pub unknown_argument_hook: Option<UnknownArgumentHook>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            name_prefixes: vec!["--".to_string(), "-".to_string()],
            long_name_prefixes: vec!["--".to_string()],
            name_value_separators: vec![':', '='],
            allow_whitespace_separator: true,
            case_sensitive_names: false,
            auto_prefix_aliases: true,
            duplicate_argument_policy: DuplicateArgumentPolicy::Error,
            culture: Culture::invariant(),
            long_short_mode: false,
            prefix_termination: None,
            unknown_argument_hook: None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the dual-prefix mode: `--name` for long names, `-x` for short
    /// names, with combined-switch expansion.
    pub fn long_short_mode(mut self) -> Self {
        self.long_short_mode = true;
        self.name_prefixes = vec!["-".to_string()];
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive_names = true;
        self
    }

    pub fn name_prefixes(mut self, prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.name_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn long_name_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.long_name_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn name_value_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.name_value_separators = separators.into_iter().collect();
        self
    }

    pub fn whitespace_separator(mut self, allow: bool) -> Self {
        self.allow_whitespace_separator = allow;
        self
    }

    pub fn prefix_aliases(mut self, enable: bool) -> Self {
        self.auto_prefix_aliases = enable;
        self
    }

    pub fn duplicate_arguments(mut self, policy: DuplicateArgumentPolicy) -> Self {
        self.duplicate_argument_policy = policy;
        self
    }

    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    /// Enable the terminator token (conventionally `--`).
    pub fn prefix_termination(mut self, terminator: impl Into<String>) -> Self {
        self.prefix_termination = Some(terminator.into());
        self
    }

    pub fn on_unknown_argument<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> UnknownArgumentAction + Send + Sync + 'static,
    {
        self.unknown_argument_hook = Some(UnknownArgumentHook::new(f));
        self
    }
}
