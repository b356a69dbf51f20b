use std::cmp::Ordering;
use std::fmt::{self, Write as _};

use chrono::{NaiveTime, Timelike};
use regex::Regex;
use serde::{Serialize, Serializer};

use super::condition::Operator;

/// A compiled regular expression carried by `~=` conditions.
///
/// Two patterns are equal when their source text is equal.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] if `source` is not a valid expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored search, like a `~=` comparison.
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Values carried by conditions and by pull request facts.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text, logins, branch names, `@org/team` references.
    Text(String),
    /// A 64-bit signed integer (numbers and counts).
    Int(i64),
    /// A boolean flag.
    Bool(bool),
    /// A time of day, always in UTC.
    Time(NaiveTime),
    /// The right-hand side of a `~=` condition.
    Pattern(Pattern),
}

impl Value {
    /// Compare this fact value to a condition value with the given operator.
    ///
    /// Returns `None` for incompatible types or operators that make no sense for
    /// the pair (e.g. `>` on booleans).
    #[must_use]
    pub fn compare(&self, op: Operator, other: &Value) -> Option<bool> {
        if op == Operator::Regex {
            return match (self, other) {
                (Value::Text(text), Value::Pattern(pattern)) => Some(pattern.is_match(text)),
                (Value::Int(n), Value::Pattern(pattern)) => Some(pattern.is_match(&n.to_string())),
                _ => None,
            };
        }
        let ord = self.partial_cmp_value(other)?;
        if matches!(self, Value::Bool(_)) && !matches!(op, Operator::Eq | Operator::Ne) {
            return None;
        }
        Some(match op {
            Operator::Eq => ord == Ordering::Equal,
            Operator::Ne => ord != Ordering::Equal,
            Operator::Gt => ord == Ordering::Greater,
            Operator::Ge => ord != Ordering::Less,
            Operator::Lt => ord == Ordering::Less,
            Operator::Le => ord != Ordering::Greater,
            Operator::Regex => return None,
        })
    }

    fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Pattern(p) => Some(p.as_str()),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<Pattern> for Value {
    fn from(v: Pattern) -> Self {
        Value::Pattern(v)
    }
}

fn format_time(t: &NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Whether text must be quoted to survive a round trip through the parser.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with(['"', '\''])
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
}

/// Writes `s` double-quoted, escaping only what the expression grammar
/// decodes inside quotes.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\0' => f.write_str("\\0")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) if needs_quotes(s) => write_quoted(f, s),
            Value::Text(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Time(t) => f.write_str(&format_time(t)),
            Value::Pattern(p) => f.write_str(p.as_str()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Time(t) => serializer.serialize_str(&format_time(t)),
            Value::Pattern(p) => serializer.serialize_str(p.as_str()),
        }
    }
}
