use std::fmt;

use serde::de::{Deserialize, Deserializer};

use super::condition::Condition;
use super::error::CompileError;
use super::evaluation_report::EvaluationReport;
use super::facts::FactProvider;

/// An ordered conjunction of conditions, as found in a rule's
/// `conditions:` list.
///
/// Immutable once built, so it can be shared behind `Arc` and evaluated
/// from many threads.
///
/// # Example
///
/// ```
/// use prpolicy::{Attribute, ConditionSet, Facts};
///
/// let conditions = ConditionSet::parse(["base=main", "-label=wip", "#approved-reviews-by>=1"])
///     .unwrap();
/// let facts = Facts::new()
///     .set(Attribute::Base, ["main"])
///     .set(Attribute::ApprovedReviewsBy, ["alice"]);
/// assert!(conditions.evaluate(&facts));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    #[must_use]
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Parse every expression, failing on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidCondition`] with the zero-based index
    /// of the expression that did not parse.
    pub fn parse<I, S>(expressions: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let conditions = expressions
            .into_iter()
            .enumerate()
            .map(|(index, expr)| {
                let expr = expr.as_ref();
                crate::parse::parse(expr).map_err(|source| CompileError::InvalidCondition {
                    index,
                    expression: expr.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = conditions.len(), "compiled condition set");
        Ok(Self { conditions })
    }

    /// Whether every condition holds. An empty set always holds.
    #[must_use]
    pub fn evaluate(&self, facts: &impl FactProvider) -> bool {
        crate::evaluate::evaluate_all(&self.conditions, facts)
    }

    /// Evaluate every condition and report which ones held.
    pub fn evaluate_detailed(&self, facts: &impl FactProvider) -> EvaluationReport {
        crate::evaluate::evaluate_detailed(&self.conditions, facts)
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let expressions = Vec::<String>::deserialize(deserializer)?;
        Self::parse(&expressions).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{attr, count, flag, Attribute, Facts};

    #[test]
    fn parse_collects_in_order() {
        let set = ConditionSet::parse(["base=main", "#files>3", "-draft"]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.conditions()[0], attr(Attribute::Base).eq("main").unwrap());
        assert_eq!(set.conditions()[1], count(Attribute::Files).gt(3_i64).unwrap());
        assert_eq!(set.conditions()[2], !flag(Attribute::Draft).unwrap());
    }

    #[test]
    fn parse_reports_failing_index() {
        let err = ConditionSet::parse(["base=main", "label=wip", "reviewer=bob"]).unwrap_err();
        match err {
            CompileError::InvalidCondition {
                index, expression, ..
            } => {
                assert_eq!(index, 2);
                assert_eq!(expression, "reviewer=bob");
            }
        }
    }

    #[test]
    fn empty_set_holds() {
        let set = ConditionSet::default();
        assert!(set.is_empty());
        assert!(set.evaluate(&Facts::new()));
    }

    #[test]
    fn evaluate_is_conjunction() {
        let set = ConditionSet::parse(["base=main", "label=ready"]).unwrap();
        let ready = Facts::new()
            .set(Attribute::Base, ["main"])
            .set(Attribute::Label, ["ready"]);
        let not_ready = Facts::new().set(Attribute::Base, ["main"]);
        assert!(set.evaluate(&ready));
        assert!(!set.evaluate(&not_ready));

        let report = set.evaluate_detailed(&not_ready);
        assert_eq!(report.unmatched(), &["label=ready"]);
    }

    #[test]
    fn display_joins_conditions() {
        let set = ConditionSet::parse(["base : main", "¬label=wip"]).unwrap();
        assert_eq!(set.to_string(), "base=main -label=wip");
    }

    #[test]
    fn deserialize_from_yaml_list() {
        let set: ConditionSet =
            serde_yaml::from_str("- base=main\n- \"#approved-reviews-by>=2\"\n").unwrap();
        assert_eq!(set.len(), 2);

        let err = serde_yaml::from_str::<ConditionSet>("- base=main\n- nope=1\n").unwrap_err();
        assert!(err.to_string().contains("condition #1"));
    }

    #[test]
    fn collect_from_iterator() {
        let set: ConditionSet = [
            flag(Attribute::Merged).unwrap(),
            attr(Attribute::Label).ne("wip").unwrap(),
        ]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }
}
