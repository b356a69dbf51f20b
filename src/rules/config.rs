use regex::Regex;
use serde_yaml::Value;

use super::document::Rule;
use super::error::ConfigError;
use super::merge::{merge, merge_into};
use super::schema::{self, Mode};

const BUILTIN_DEFAULT: &str = include_str!("default_rule.yml");

/// The rule every branch starts from before user overrides are applied.
///
/// Only checked leniently when loaded: a default that is missing keys is
/// reported by the strict check after merging, as a configuration error.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultRule {
    doc: Value,
}

impl DefaultRule {
    /// The default rule shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        let doc =
            serde_yaml::from_str(BUILTIN_DEFAULT).expect("embedded default rule is valid YAML");
        Self { doc }
    }

    /// Load a custom default rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed YAML and
    /// [`ConfigError::Invalid`] if a present key has the wrong type.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let doc = serde_yaml::from_str(text).map_err(ConfigError::from_yaml)?;
        Self::from_value(doc)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a present key has the wrong type.
    pub fn from_value(doc: Value) -> Result<Self, ConfigError> {
        schema::validate(&doc, Mode::Lenient)?;
        Ok(Self { doc })
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.doc
    }
}

impl Default for DefaultRule {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Outcome of resolving the rule for a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchRule {
    /// The merged, strictly validated rule.
    Protected(Rule),
    /// The first matching branch pattern maps to `null`: no policy applies.
    NoPolicy,
}

impl BranchRule {
    #[must_use]
    pub fn rule(&self) -> Option<&Rule> {
        match self {
            BranchRule::Protected(rule) => Some(rule),
            BranchRule::NoPolicy => None,
        }
    }
}

/// A user's `rules:` configuration: an optional default override and
/// ordered per-branch overrides.
///
/// # Example
///
/// ```
/// use prpolicy::rules::{BranchRule, DefaultRule, UserConfig};
///
/// let config = UserConfig::from_yaml(
///     "
/// rules:
///   default:
///     disabling_label: wip
///   branches:
///     gh-pages: null
///     stable/.*:
///       protection:
///         enforce_admins: true
/// ",
/// )
/// .unwrap();
///
/// let default = DefaultRule::builtin();
/// let rule = config.rule_for_branch(&default, "stable/2.0").unwrap();
/// assert_eq!(rule.rule().unwrap().disabling_label, "wip");
/// assert_eq!(config.rule_for_branch(&default, "gh-pages").unwrap(), BranchRule::NoPolicy);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserConfig {
    default: Option<Value>,
    branches: Vec<(String, Option<Value>)>,
}

impl UserConfig {
    /// Parse and leniently validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] with the line and column of a syntax
    /// error, or [`ConfigError::Invalid`] listing every schema violation.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let doc = serde_yaml::from_str(text).map_err(ConfigError::from_yaml)?;
        Self::from_value(&doc)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every schema violation.
    pub fn from_value(doc: &Value) -> Result<Self, ConfigError> {
        schema::validate_config(doc)?;

        let mut config = UserConfig::default();
        let Some(rules) = doc.get("rules").and_then(Value::as_mapping) else {
            tracing::debug!("configuration has no rules");
            return Ok(config);
        };

        config.default = rules.get("default").cloned();
        if let Some(branches) = rules.get("branches").and_then(Value::as_mapping) {
            for (pattern, rule) in branches {
                // Keys are strings once validated.
                if let Some(pattern) = pattern.as_str() {
                    let rule = (!rule.is_null()).then(|| rule.clone());
                    config.branches.push((pattern.to_owned(), rule));
                }
            }
        }

        tracing::debug!(
            has_default = config.default.is_some(),
            branches = config.branches.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Branch patterns in declaration order.
    pub fn branch_patterns(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|(pattern, _)| pattern.as_str())
    }

    /// Merge the user default over `default`, then the override of the first
    /// branch pattern that matches the start of `branch`.
    ///
    /// Returns `None` when that override is `null`. Patterns after the
    /// first match are neither compiled nor tested. The result is not
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BranchPattern`] if a pattern tested before the
    /// match is not a valid regular expression.
    pub fn merged_document(
        &self,
        default: &DefaultRule,
        branch: &str,
    ) -> Result<Option<Value>, ConfigError> {
        let mut doc = match &self.default {
            Some(user_default) => merge(default.as_value(), user_default),
            None => default.as_value().clone(),
        };

        for (pattern, rule) in &self.branches {
            if !branch_matches(pattern, branch)? {
                continue;
            }
            tracing::debug!(branch, pattern = %pattern, "branch pattern matched");
            match rule {
                Some(rule) => merge_into(&mut doc, rule),
                None => return Ok(None),
            }
            break;
        }

        Ok(Some(doc))
    }

    /// Resolve the concrete rule for `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BranchPattern`] for an invalid pattern,
    /// [`ConfigError::Invalid`] if the merged rule is incomplete or
    /// mistyped, and [`ConfigError::Decode`] if it cannot be decoded.
    pub fn rule_for_branch(
        &self,
        default: &DefaultRule,
        branch: &str,
    ) -> Result<BranchRule, ConfigError> {
        let Some(doc) = self.merged_document(default, branch)? else {
            tracing::info!(branch, "no policy for branch");
            return Ok(BranchRule::NoPolicy);
        };

        schema::validate(&doc, Mode::Strict)?;
        let rule: Rule = serde_yaml::from_value(doc).map_err(ConfigError::Decode)?;
        tracing::info!(branch, disabling_label = %rule.disabling_label, "resolved branch rule");
        Ok(BranchRule::Protected(rule))
    }
}

fn branch_matches(pattern: &str, branch: &str) -> Result<bool, ConfigError> {
    let anchored = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
        ConfigError::BranchPattern {
            pattern: pattern.to_owned(),
            source,
        }
    })?;
    Ok(anchored.is_match(branch))
}
