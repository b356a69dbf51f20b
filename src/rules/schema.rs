use std::fmt;

use serde_yaml::Value;

use super::error::{Issue, IssueKind, ValidationError};

/// How strictly a document is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// User-supplied, pre-merge input: keys may be omitted, present values
    /// are type-checked.
    Lenient,
    /// Fully merged rule: every key the schema lists must be present.
    Strict,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Lenient => "lenient",
            Mode::Strict => "strict",
        })
    }
}

/// One step in a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a document.
///
/// Renders dotted (`protection.enforce_admins`); keys that are not plain
/// identifiers render bracketed (`rules.branches["rele.*"]`), list indices
/// as `[0]`, and the document root as `(root)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl FromIterator<Segment> for KeyPath {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if is_identifier(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                Segment::Key(key) => write!(f, "[{key:?}]")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[derive(Debug, Clone, Copy)]
enum Requirement {
    /// Required in every mode.
    Always,
    /// Required only in [`Mode::Strict`].
    Strict,
    Optional,
}

impl Requirement {
    fn required(self, mode: Mode) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::Strict => mode == Mode::Strict,
            Requirement::Optional => false,
        }
    }
}

#[derive(Debug)]
enum Shape {
    Bool,
    Str,
    Int { min: i64, max: i64 },
    StrList,
    EmptyList,
    Nullable(&'static Shape),
    /// Fixed keys; anything else is rejected.
    Map(&'static [Field]),
    /// String keys mapped to values of one shape.
    MapOf(&'static Shape),
}

#[derive(Debug)]
struct Field {
    key: &'static str,
    requirement: Requirement,
    shape: Shape,
}

impl Field {
    const fn new(key: &'static str, requirement: Requirement, shape: Shape) -> Self {
        Self {
            key,
            requirement,
            shape,
        }
    }
}

const STATUS_CHECKS: &[Field] = &[
    Field::new("strict", Requirement::Strict, Shape::Bool),
    Field::new("contexts", Requirement::Strict, Shape::StrList),
];

const PULL_REQUEST_REVIEWS: &[Field] = &[
    Field::new("dismiss_stale_reviews", Requirement::Strict, Shape::Bool),
    Field::new("require_code_owner_reviews", Requirement::Strict, Shape::Bool),
    Field::new(
        "required_approving_review_count",
        Requirement::Strict,
        Shape::Int { min: 1, max: 6 },
    ),
];

const PROTECTION: &[Field] = &[
    Field::new(
        "required_status_checks",
        Requirement::Strict,
        Shape::Nullable(&Shape::Map(STATUS_CHECKS)),
    ),
    Field::new(
        "required_pull_request_reviews",
        Requirement::Strict,
        Shape::Nullable(&Shape::Map(PULL_REQUEST_REVIEWS)),
    ),
    Field::new(
        "restrictions",
        Requirement::Strict,
        Shape::Nullable(&Shape::EmptyList),
    ),
    Field::new(
        "enforce_admins",
        Requirement::Strict,
        Shape::Nullable(&Shape::Bool),
    ),
];

const RULE_FIELDS: &[Field] = &[
    Field::new("protection", Requirement::Strict, Shape::Map(PROTECTION)),
    Field::new("disabling_label", Requirement::Strict, Shape::Str),
    Field::new(
        "automated_backport_labels",
        Requirement::Optional,
        Shape::MapOf(&Shape::Str),
    ),
];

const RULE: Shape = Shape::Map(RULE_FIELDS);

const RULES: &[Field] = &[
    Field::new("default", Requirement::Optional, RULE),
    Field::new(
        "branches",
        Requirement::Optional,
        Shape::MapOf(&Shape::Nullable(&RULE)),
    ),
];

const CONFIG: &[Field] = &[Field::new(
    "rules",
    Requirement::Always,
    Shape::Nullable(&Shape::Map(RULES)),
)];

/// Validate a rule document.
///
/// Every issue is collected rather than stopping at the first one.
///
/// # Errors
///
/// Returns [`ValidationError`] listing each offending path.
pub fn validate(doc: &Value, mode: Mode) -> Result<(), ValidationError> {
    run(&RULE, doc, mode)
}

/// Validate a user configuration document (`rules:` with optional
/// `default` and `branches`). Always lenient.
pub(crate) fn validate_config(doc: &Value) -> Result<(), ValidationError> {
    run(&Shape::Map(CONFIG), doc, Mode::Lenient)
}

fn run(shape: &Shape, doc: &Value, mode: Mode) -> Result<(), ValidationError> {
    let mut walker = Walker {
        mode,
        path: KeyPath::default(),
        issues: Vec::new(),
    };
    walker.check(shape, doc);

    if walker.issues.is_empty() {
        Ok(())
    } else {
        tracing::warn!(
            %mode,
            issues = walker.issues.len(),
            first = %walker.issues[0],
            "document failed validation"
        );
        Err(ValidationError::new(mode, walker.issues))
    }
}

struct Walker {
    mode: Mode,
    path: KeyPath,
    issues: Vec<Issue>,
}

impl Walker {
    fn report(&mut self, kind: IssueKind) {
        self.issues.push(Issue::new(self.path.clone(), kind));
    }

    fn wrong_type(&mut self, expected: &'static str) {
        self.report(IssueKind::WrongType { expected });
    }

    fn nested(&mut self, segment: Segment, f: impl FnOnce(&mut Self)) {
        self.path.push(segment);
        f(self);
        self.path.pop();
    }

    fn check(&mut self, shape: &Shape, value: &Value) {
        match shape {
            Shape::Bool => {
                if !value.is_bool() {
                    self.wrong_type("a boolean");
                }
            }
            Shape::Str => {
                if !value.is_string() {
                    self.wrong_type("a string");
                }
            }
            Shape::Int { min, max } => match value.as_i64() {
                Some(actual) if (*min..=*max).contains(&actual) => {}
                Some(actual) => self.report(IssueKind::OutOfRange {
                    actual,
                    min: *min,
                    max: *max,
                }),
                None => self.wrong_type("an integer"),
            },
            Shape::StrList => match value.as_sequence() {
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        self.nested(Segment::Index(index), |w| w.check(&Shape::Str, item));
                    }
                }
                None => self.wrong_type("a list of strings"),
            },
            Shape::EmptyList => {
                if !value.as_sequence().is_some_and(Vec::is_empty) {
                    self.wrong_type("an empty list");
                }
            }
            Shape::Nullable(inner) => {
                if !value.is_null() {
                    self.check(inner, value);
                }
            }
            Shape::Map(fields) => self.check_fields(fields, value),
            Shape::MapOf(inner) => match value.as_mapping() {
                Some(map) => {
                    for (key, item) in map {
                        match key.as_str() {
                            Some(key) => {
                                self.nested(Segment::Key(key.to_owned()), |w| w.check(inner, item));
                            }
                            None => self.nested(Segment::Key(key_label(key)), |w| {
                                w.wrong_type("a string key");
                            }),
                        }
                    }
                }
                None => self.wrong_type("a mapping"),
            },
        }
    }

    fn check_fields(&mut self, fields: &[Field], value: &Value) {
        let Some(map) = value.as_mapping() else {
            self.wrong_type("a mapping");
            return;
        };

        for field in fields {
            self.nested(Segment::Key(field.key.to_owned()), |w| match map.get(field.key) {
                Some(item) => w.check(&field.shape, item),
                None if field.requirement.required(w.mode) => w.report(IssueKind::Missing),
                None => {}
            });
        }

        for key in map.keys() {
            let known = key
                .as_str()
                .is_some_and(|k| fields.iter().any(|f| f.key == k));
            if !known {
                self.nested(Segment::Key(key_label(key)), |w| {
                    w.report(IssueKind::UnknownKey);
                });
            }
        }
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_owned(),
        _ => "?".to_owned(),
    }
}
