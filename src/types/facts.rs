use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::attribute::Attribute;
use super::value::Value;

/// Source of pull request facts that conditions are evaluated against.
///
/// Every attribute is list-valued: scalar facts such as `base` are a
/// one-element list and a missing fact is an empty list.
pub trait FactProvider {
    /// The values of an attribute.
    fn values(&self, attribute: Attribute) -> Cow<'_, [Value]>;

    /// Members of a team referenced as `@team` or `@org/team`, if known.
    fn team_members(&self, _team: &str) -> Option<Vec<String>> {
        None
    }
}

/// In-memory [`FactProvider`] keyed by [`Attribute`].
#[derive(Debug, Clone, Default)]
pub struct Facts {
    values: HashMap<Attribute, Vec<Value>>,
    teams: HashMap<String, Vec<String>>,
}

impl Facts {
    /// Create an empty fact set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values of an attribute.
    #[must_use]
    pub fn set<I, V>(mut self, attribute: Attribute, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(attribute, values.into_iter().map(Into::into).collect());
        self
    }

    /// Append one value to an attribute.
    #[must_use]
    pub fn push(mut self, attribute: Attribute, value: impl Into<Value>) -> Self {
        self.values
            .entry(attribute)
            .or_default()
            .push(value.into());
        self
    }

    /// Set a boolean attribute such as `merged` or `draft`.
    #[must_use]
    pub fn flag(self, attribute: Attribute, on: bool) -> Self {
        self.set(attribute, [on])
    }

    /// Register the members of a team reference (e.g. `"@org/devs"`).
    #[must_use]
    pub fn team<I, S>(mut self, team: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams
            .insert(team.to_owned(), members.into_iter().map(Into::into).collect());
        self
    }

    /// Set `current-time` from a UTC timestamp.
    #[must_use]
    pub fn at(self, now: DateTime<Utc>) -> Self {
        self.set(Attribute::CurrentTime, [now.time()])
    }

    /// Replace all values of an attribute (mutable reference version).
    pub fn insert(&mut self, attribute: Attribute, values: Vec<Value>) {
        self.values.insert(attribute, values);
    }

    #[must_use]
    pub fn get(&self, attribute: Attribute) -> &[Value] {
        self.values.get(&attribute).map(Vec::as_slice).unwrap_or_default()
    }
}

impl FactProvider for Facts {
    fn values(&self, attribute: Attribute) -> Cow<'_, [Value]> {
        Cow::Borrowed(self.get(attribute))
    }

    fn team_members(&self, team: &str) -> Option<Vec<String>> {
        self.teams.get(team).cloned()
    }
}
