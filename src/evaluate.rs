use std::time::Instant;

use crate::types::{Condition, EvaluationReport, FactProvider, Operator, Value, ValueGrammar};

/// Evaluate one condition against the facts.
///
/// Quantified conditions compare the number of values. Otherwise `!=`
/// must hold for every value and all other operators for at least one, so
/// `label!=wip` is true when no label is `wip` (including no labels at all).
pub(crate) fn evaluate(condition: &Condition, facts: &impl FactProvider) -> bool {
    let values = facts.values(condition.attribute());
    let op = condition.operator();
    let expected = condition.value();

    let result = if condition.quantified() {
        let count = i64::try_from(values.len()).unwrap_or(i64::MAX);
        Value::Int(count).compare(op, expected).unwrap_or(false)
    } else {
        let members = if condition.attribute().grammar() == ValueGrammar::LoginOrTeam {
            team_members(expected, facts)
        } else {
            None
        };
        let check = |actual: &Value| match &members {
            Some(logins) => actual
                .as_str()
                .map(|login| logins.iter().any(|m| m == login))
                .map(|in_team| if op == Operator::Ne { !in_team } else { in_team })
                .unwrap_or(false),
            None => actual.compare(op, expected).unwrap_or(false),
        };
        if op == Operator::Ne {
            values.iter().all(check)
        } else {
            values.iter().any(check)
        }
    };

    result != condition.negated()
}

/// Resolve an `@team` reference to its member logins.
fn team_members(expected: &Value, facts: &impl FactProvider) -> Option<Vec<String>> {
    match expected {
        Value::Text(name) if name.starts_with('@') => {
            let members = facts.team_members(name);
            if members.is_none() {
                tracing::debug!(team = %name, "unknown team, comparing as literal");
            }
            members
        }
        _ => None,
    }
}

pub(crate) fn evaluate_all(conditions: &[Condition], facts: &impl FactProvider) -> bool {
    conditions.iter().all(|c| evaluate(c, facts))
}

pub(crate) fn evaluate_detailed(
    conditions: &[Condition],
    facts: &impl FactProvider,
) -> EvaluationReport {
    let start = Instant::now();
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for condition in conditions {
        if evaluate(condition, facts) {
            matched.push(condition.to_string());
        } else {
            unmatched.push(condition.to_string());
        }
    }

    EvaluationReport::new(matched, unmatched, start.elapsed())
}
