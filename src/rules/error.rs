use std::fmt;

use thiserror::Error;

use super::schema::{KeyPath, Mode};

/// What is wrong at one location of a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueKind {
    #[error("required key not provided")]
    Missing,

    #[error("extra keys not allowed")]
    UnknownKey,

    #[error("expected {expected}")]
    WrongType { expected: &'static str },

    #[error("value {actual} must be between {min} and {max}")]
    OutOfRange { actual: i64, min: i64, max: i64 },
}

/// One validation failure and where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    path: KeyPath,
    kind: IssueKind,
}

impl Issue {
    pub(crate) fn new(path: KeyPath, kind: IssueKind) -> Self {
        Self { path, kind }
    }

    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> &IssueKind {
        &self.kind
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// A document failed lenient or strict validation.
///
/// Holds every issue found, in document order; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    mode: Mode,
    issues: Vec<Issue>,
}

impl ValidationError {
    pub(crate) fn new(mode: Mode, issues: Vec<Issue>) -> Self {
        Self { mode, issues }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// The first issue reported at `path` (dotted form), if any.
    #[must_use]
    pub fn issue_at(&self, path: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.path.to_string() == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: ", self.mode)?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors produced while loading configuration or resolving a branch rule.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML at line {line}, column {column}: {message}")]
    Yaml {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid YAML: {message}")]
    YamlUnpositioned { message: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("invalid branch pattern '{pattern}': {source}")]
    BranchPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot decode rule: {0}")]
    Decode(#[source] serde_yaml::Error),
}

impl ConfigError {
    pub(crate) fn from_yaml(err: serde_yaml::Error) -> Self {
        match err.location() {
            Some(location) => ConfigError::Yaml {
                line: location.line(),
                column: location.column(),
                message: err.to_string(),
            },
            None => ConfigError::YamlUnpositioned {
                message: err.to_string(),
            },
        }
    }
}
