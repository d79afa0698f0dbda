//! Token classification: decide whether a raw token names an argument, and
//! split it into name + optional inline value.
//!
//! Classification is a pure function of the token and the configured
//! prefixes/separators; it never touches parse state.

use crate::options::ParseOptions;

/// Which prefix set matched the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrefixKind {
    /// Single-mode prefix; one namespace for all names.
    Plain,
    /// Long-name prefix (long/short mode).
    Long,
    /// Short-name prefix (long/short mode).
    Short,
}

/// A token recognized as an argument name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NameToken<'a> {
    pub kind: PrefixKind,
    /// Candidate name, without prefix or inline value.
    pub name: &'a str,
    /// Inline value following the first name/value separator. The separator
    /// itself belongs to neither part.
    pub inline: Option<&'a str>,
    /// The full original token, for error reporting.
    pub original: &'a str,
}

/// Classify one raw token. `None` means the token is a plain value: it
/// carries no recognized prefix, or is nothing but a prefix (`-` alone
/// conventionally means stdin).
pub(crate) fn classify<'a>(token: &'a str, options: &ParseOptions) -> Option<NameToken<'a>> {
    let (kind, body) = if options.long_short_mode {
        if let Some(body) = strip_any(token, &options.long_name_prefixes) {
            (PrefixKind::Long, body)
        } else if let Some(body) = strip_any(token, &options.name_prefixes) {
            (PrefixKind::Short, body)
        } else {
            return None;
        }
    } else if let Some(body) = strip_any(token, &options.name_prefixes) {
        (PrefixKind::Plain, body)
    } else {
        return None;
    };

    if body.is_empty() {
        return None;
    }

    let (name, inline) = split_inline(body, &options.name_value_separators);
    Some(NameToken {
        kind,
        name,
        inline,
        original: token,
    })
}

/// Strip the longest matching prefix so `--` wins over `-`.
fn strip_any<'a>(token: &'a str, prefixes: &[String]) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    for prefix in prefixes {
        if !prefix.is_empty()
            && token.starts_with(prefix.as_str())
            && best.is_none_or(|b| prefix.len() > b.len())
        {
            best = Some(prefix.as_str());
        }
    }
    best.map(|prefix| &token[prefix.len()..])
}

/// Split on the first separator occurrence after the prefix.
fn split_inline<'a>(body: &'a str, separators: &[char]) -> (&'a str, Option<&'a str>) {
    for (i, c) in body.char_indices() {
        if separators.contains(&c) {
            return (&body[..i], Some(&body[i + c.len_utf8()..]));
        }
    }
    (body, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> ParseOptions {
        ParseOptions::default()
    }

    fn long_short() -> ParseOptions {
        ParseOptions::default().long_short_mode()
    }

    #[test]
    fn plain_values_do_not_classify() {
        assert_eq!(classify("file.txt", &single()), None);
        assert_eq!(classify("-", &single()), None);
        assert_eq!(classify("", &single()), None);
    }

    #[test]
    fn single_mode_accepts_both_prefixes() {
        let t = classify("-lines", &single()).unwrap();
        assert_eq!((t.kind, t.name, t.inline), (PrefixKind::Plain, "lines", None));

        let t = classify("--lines", &single()).unwrap();
        assert_eq!((t.kind, t.name, t.inline), (PrefixKind::Plain, "lines", None));
    }

    #[test]
    fn inline_value_splits_on_first_separator() {
        let t = classify("-out:a:b", &single()).unwrap();
        assert_eq!(t.name, "out");
        assert_eq!(t.inline, Some("a:b"));

        let t = classify("-out=x", &single()).unwrap();
        assert_eq!(t.inline, Some("x"));

        let t = classify("-out:", &single()).unwrap();
        assert_eq!(t.inline, Some(""));
    }

    #[test]
    fn long_short_mode_distinguishes_prefix_kinds() {
        let t = classify("--verbose", &long_short()).unwrap();
        assert_eq!(t.kind, PrefixKind::Long);

        let t = classify("-v", &long_short()).unwrap();
        assert_eq!(t.kind, PrefixKind::Short);

        // "--" alone is all prefix, no body
        assert_eq!(classify("--", &long_short()), None);
    }
}
