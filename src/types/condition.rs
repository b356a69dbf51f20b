use std::fmt;
use std::ops::Not;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::attribute::{Attribute, ValueGrammar};
use super::value::{Pattern, Value};
use crate::parse::{ParseError, ParseErrorKind};

/// Operators a condition can use, after alias normalisation.
///
/// `:` and `==` become [`Operator::Eq`], `≠` becomes [`Operator::Ne`],
/// `≥`/`≤` become [`Operator::Ge`]/[`Operator::Le`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Regex,
}

impl Operator {
    /// The canonical ASCII spelling.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Regex => "~=",
        }
    }

    #[must_use]
    pub fn is_equality(self) -> bool {
        matches!(self, Operator::Eq | Operator::Ne)
    }

    #[must_use]
    pub fn is_range(self) -> bool {
        matches!(self, Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One parsed condition: an attribute, an operator and a value, plus the
/// orthogonal negation and count flags.
///
/// Conditions are immutable; build them with [`parse`](crate::parse::parse),
/// [`str::parse`], or the [`attr()`], [`count()`] and [`flag()`] helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    negated: bool,
    quantified: bool,
    attribute: Attribute,
    operator: Operator,
    value: Value,
}

impl Condition {
    pub(crate) fn new(
        negated: bool,
        quantified: bool,
        attribute: Attribute,
        operator: Operator,
        value: Value,
    ) -> Self {
        Self {
            negated,
            quantified,
            attribute,
            operator,
            value,
        }
    }

    #[must_use]
    pub fn negated(&self) -> bool {
        self.negated
    }

    /// True when the condition tests the number of values (`#files>3`).
    #[must_use]
    pub fn quantified(&self) -> bool {
        self.quantified
    }

    #[must_use]
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The key of the canonical tree: the attribute name, prefixed with `#`
    /// when quantified.
    #[must_use]
    pub fn key(&self) -> String {
        if self.quantified {
            format!("#{}", self.attribute.name())
        } else {
            self.attribute.name().to_owned()
        }
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(mut self) -> Condition {
        self.negated = !self.negated;
        self
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("-")?;
        }
        f.write_str(&self.key())?;
        if self.value == Value::Bool(true) && self.operator == Operator::Eq {
            return Ok(());
        }
        match &self.value {
            // Token grammars never quote; only free text reads a quoted string.
            Value::Text(s) if self.attribute.grammar() != ValueGrammar::Text => {
                write!(f, "{}{s}", self.operator)
            }
            value => write!(f, "{}{value}", self.operator),
        }
    }
}

/// Serializes the canonical tree: `{op: [key, value]}`, wrapped in
/// `{"-": ...}` when negated.
impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Inner<'a>(&'a Condition);

        impl Serialize for Inner<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(self.0.operator.symbol(), &(self.0.key(), &self.0.value))?;
                map.end()
            }
        }

        if self.negated {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry("-", &Inner(self))?;
            map.end()
        } else {
            Inner(self).serialize(serializer)
        }
    }
}

impl FromStr for Condition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse(s)
    }
}

/// Conditions deserialize from their expression text.
impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Intermediate builder for attribute conditions.
/// Created by [`attr()`] or [`count()`]; requires an operator method to
/// produce a [`Condition`].
///
/// Every operator method applies the rules the parser applies, so a built
/// condition always renders to text that parses back to it.
#[derive(Debug, Clone)]
pub struct AttributeExpr {
    attribute: Attribute,
    quantified: bool,
}

/// Result of building a condition outside the parser.
pub type BuildResult = Result<Condition, ParseErrorKind>;

impl AttributeExpr {
    fn build(self, operator: Operator, value: Value) -> BuildResult {
        crate::parse::check(self.attribute, self.quantified, operator, &value)?;
        Ok(Condition::new(
            false,
            self.quantified,
            self.attribute,
            operator,
            value,
        ))
    }

    /// # Errors
    ///
    /// Returns the [`ParseErrorKind`] the parser would report for the same
    /// attribute, operator and value.
    pub fn eq(self, value: impl Into<Value>) -> BuildResult {
        self.build(Operator::Eq, value.into())
    }

    /// # Errors
    ///
    /// See [`AttributeExpr::eq`].
    pub fn ne(self, value: impl Into<Value>) -> BuildResult {
        self.build(Operator::Ne, value.into())
    }

    /// # Errors
    ///
    /// See [`AttributeExpr::eq`].
    pub fn lt(self, value: impl Into<Value>) -> BuildResult {
        self.build(Operator::Lt, value.into())
    }

    /// # Errors
    ///
    /// See [`AttributeExpr::eq`].
    pub fn le(self, value: impl Into<Value>) -> BuildResult {
        self.build(Operator::Le, value.into())
    }

    /// # Errors
    ///
    /// See [`AttributeExpr::eq`].
    pub fn gt(self, value: impl Into<Value>) -> BuildResult {
        self.build(Operator::Gt, value.into())
    }

    /// # Errors
    ///
    /// See [`AttributeExpr::eq`].
    pub fn ge(self, value: impl Into<Value>) -> BuildResult {
        self.build(Operator::Ge, value.into())
    }

    /// A `~=` condition.
    ///
    /// # Errors
    ///
    /// Returns [`ParseErrorKind::InvalidRegex`] when `pattern` does not
    /// compile, or the operator error when the attribute takes no `~=`.
    pub fn matches(self, pattern: &str) -> BuildResult {
        let pattern = Pattern::new(pattern).map_err(|e| ParseErrorKind::InvalidRegex {
            message: e.to_string(),
        })?;
        self.build(Operator::Regex, Value::Pattern(pattern))
    }
}

#[must_use]
pub fn attr(attribute: Attribute) -> AttributeExpr {
    AttributeExpr {
        attribute,
        quantified: false,
    }
}

/// Start a `#attribute` condition comparing the number of values.
#[must_use]
pub fn count(attribute: Attribute) -> AttributeExpr {
    AttributeExpr {
        attribute,
        quantified: true,
    }
}

/// A boolean attribute condition such as `merged` (`merged = true`).
///
/// # Errors
///
/// Returns [`ParseErrorKind::ExpectedOperator`] for an attribute that is not
/// boolean, as the parser does for a bare `label`.
pub fn flag(attribute: Attribute) -> BuildResult {
    if attribute.grammar() != ValueGrammar::Boolean {
        return Err(ParseErrorKind::ExpectedOperator { attribute });
    }
    Ok(Condition::new(
        false,
        false,
        attribute,
        Operator::Eq,
        Value::Bool(true),
    ))
}

/// A `current-time` condition.
///
/// # Errors
///
/// Returns [`ParseErrorKind::IncompatibleOperator`] for an equality or regex
/// operator, and [`ParseErrorKind::MalformedTime`] for a time with seconds.
pub fn current_time(operator: Operator, time: NaiveTime) -> BuildResult {
    attr(Attribute::CurrentTime).build(operator, Value::Time(time))
}
