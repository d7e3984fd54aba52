//! Format strings for [`FormatStringFieldFallback`](crate::FormatStringFieldFallback).
//!
//! Supported syntax: literal text, `{{` and `}}` escapes, and placeholders
//! `{name}` or `{name:spec}` where `spec` is `[0][width][.precision][type]`
//! and `type` is one of `s`, `d`, `f`. Numbers align right and text aligns
//! left; a leading `0` pads numbers with zeros after the sign.

use std::collections::BTreeMap;

use cfm_core::ConfigError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FormatString {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, spec: Spec },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Spec {
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    ty: Option<char>,
}

impl FormatString {
    pub(crate) fn parse(source: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| {
            ConfigError::Schema(format!("invalid format string {source:?}: {reason}"))
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("single '}' outside a placeholder")),
                '{' => {
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(invalid("unterminated placeholder")),
                            Some(ch) => body.push(ch),
                        }
                    }
                    let (name, spec) = match body.split_once(':') {
                        Some((name, spec)) => (name, Spec::parse(spec).ok_or_else(|| invalid(spec))?),
                        None => (body.as_str(), Spec::default()),
                    };
                    if name.is_empty() {
                        return Err(invalid("placeholder without a field name"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder {
                        name: name.to_string(),
                        spec,
                    });
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub(crate) fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub(crate) fn render(&self, values: &BTreeMap<String, Value>) -> Result<String, ConfigError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, spec } => {
                    let value = values.get(name).unwrap_or(&Value::Null);
                    out.push_str(&spec.apply(name, value)?);
                }
            }
        }
        Ok(out)
    }
}

impl Spec {
    fn parse(spec: &str) -> Option<Self> {
        let mut parsed = Spec::default();
        let mut rest = spec;

        if let Some(stripped) = rest.strip_prefix('0') {
            parsed.zero_pad = true;
            rest = stripped;
        }
        let width_len = rest.chars().take_while(char::is_ascii_digit).count();
        if width_len > 0 {
            parsed.width = Some(rest[..width_len].parse().ok()?);
            rest = &rest[width_len..];
        }
        if let Some(stripped) = rest.strip_prefix('.') {
            let precision_len = stripped.chars().take_while(char::is_ascii_digit).count();
            if precision_len == 0 {
                return None;
            }
            parsed.precision = Some(stripped[..precision_len].parse().ok()?);
            rest = &stripped[precision_len..];
        }
        match rest {
            "" => {}
            "s" | "d" | "f" => parsed.ty = rest.chars().next(),
            _ => return None,
        }
        Some(parsed)
    }

    fn apply(&self, name: &str, value: &Value) -> Result<String, ConfigError> {
        let mismatch = |expected: &str| {
            ConfigError::FallbackResolution(format!(
                "Fallback format field '{name}' is not {expected}"
            ))
        };

        let (body, numeric) = match (self.ty, value) {
            (Some('d'), Value::Number(n)) => {
                (n.as_i64().map(|i| i.to_string()).ok_or_else(|| mismatch("an integer"))?, true)
            }
            (Some('d'), _) => return Err(mismatch("an integer")),
            (Some('f'), Value::Number(n)) => {
                let f = n.as_f64().ok_or_else(|| mismatch("a number"))?;
                (format!("{:.*}", self.precision.unwrap_or(6), f), true)
            }
            (Some('f'), _) => return Err(mismatch("a number")),
            (_, Value::Number(n)) => match (self.precision, n.as_f64()) {
                (Some(p), Some(f)) => (format!("{f:.p$}"), true),
                _ => (n.to_string(), true),
            },
            (_, Value::String(s)) => match self.precision {
                Some(p) => (s.chars().take(p).collect(), false),
                None => (s.clone(), false),
            },
            (_, Value::Null) => (String::new(), false),
            (_, other) => (other.to_string(), false),
        };

        let len = body.chars().count();
        let width = self.width.unwrap_or(0);
        if len >= width {
            return Ok(body);
        }
        let fill = width - len;
        let padded = if numeric && self.zero_pad {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(digits) => ("-", digits),
                None => ("", body.as_str()),
            };
            format!("{sign}{}{digits}", "0".repeat(fill))
        } else if numeric {
            format!("{}{body}", " ".repeat(fill))
        } else {
            format!("{body}{}", " ".repeat(fill))
        };
        Ok(padded)
    }
}
