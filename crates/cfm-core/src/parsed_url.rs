//! # Parsed URLs
//!
//! URL fields expose the generic component split of their text value:
//! scheme, network location, path, query, and fragment. The split never
//! fails; relative references such as `foo` yield a path-only value.
//!
//! When the value carries a scheme and is a well-formed absolute URL, the
//! fully parsed [`url::Url`] is kept alongside the components so consumers
//! can reach host, port, and query pairs without reparsing.

use std::fmt;

use serde::{Serialize, Serializer};
use url::Url;

/// Component split of a URL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    original: String,
    scheme: String,
    netloc: String,
    path: String,
    query: String,
    fragment: String,
    absolute: Option<Url>,
}

impl ParsedUrl {
    /// Split `input` into its components.
    ///
    /// The scheme is lowercased. Every other component is kept verbatim,
    /// including non-ASCII text.
    pub fn parse(input: &str) -> Self {
        let (rest, fragment) = split_suffix(input, '#');
        let (rest, query) = split_suffix(rest, '?');

        let (scheme, rest) = match rest.split_once(':') {
            Some((candidate, after)) if is_scheme(candidate) => {
                (candidate.to_ascii_lowercase(), after)
            }
            _ => (String::new(), rest),
        };

        let (netloc, path) = match rest.strip_prefix("//") {
            Some(authority) => match authority.find('/') {
                Some(idx) => (&authority[..idx], &authority[idx..]),
                None => (authority, ""),
            },
            None => ("", rest),
        };

        let absolute = if scheme.is_empty() {
            None
        } else {
            Url::parse(input).ok()
        };

        Self {
            original: input.to_string(),
            scheme,
            netloc: netloc.to_string(),
            path: path.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
            absolute,
        }
    }

    /// The text this value was parsed from.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Lowercased scheme, empty for relative references.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Network location (`user:pass@host:port`), empty when absent.
    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Fragment without the leading `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The fully parsed URL, if the value is a well-formed absolute URL.
    pub fn as_url(&self) -> Option<&Url> {
        self.absolute.as_ref()
    }

    /// Host name, for absolute URLs that have one.
    pub fn host(&self) -> Option<&str> {
        self.absolute.as_ref().and_then(Url::host_str)
    }

    /// Explicit or scheme-default port, for absolute URLs.
    pub fn port(&self) -> Option<u16> {
        self.absolute.as_ref().and_then(Url::port_or_known_default)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Serialize for ParsedUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

/// Split at the first `sep`, returning the text before it and after it.
fn split_suffix(input: &str, sep: char) -> (&str, &str) {
    match input.split_once(sep) {
        Some((head, tail)) => (head, tail),
        None => (input, ""),
    }
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-`, or `.`.
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
