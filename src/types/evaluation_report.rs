use std::fmt;
use std::time::Duration;

/// Detailed evaluation report returned by
/// [`ConditionSet::evaluate_detailed()`](super::condition_set::ConditionSet::evaluate_detailed).
///
/// Lists which conditions held and which did not, in declaration order,
/// and the wall-clock duration of the evaluation.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    matched: Vec<String>,
    unmatched: Vec<String>,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(matched: Vec<String>, unmatched: Vec<String>, duration: Duration) -> Self {
        Self {
            matched,
            unmatched,
            duration,
        }
    }

    /// Whether every condition held, same as
    /// [`ConditionSet::evaluate()`](super::condition_set::ConditionSet::evaluate).
    #[must_use]
    pub fn passed(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Conditions that held, rendered in search syntax.
    #[must_use]
    pub fn matched(&self) -> &[String] {
        &self.matched
    }

    /// Conditions that did not hold, rendered in search syntax.
    #[must_use]
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "passed: {}", self.passed())?;
        write!(f, ", matched: [{}]", self.matched.join(", "))?;
        write!(f, ", unmatched: [{}]", self.unmatched.join(", "))?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accessors() {
        let report = EvaluationReport::new(
            vec!["base=main".into()],
            vec!["#files<3".into()],
            Duration::from_nanos(500),
        );

        assert!(!report.passed());
        assert_eq!(report.matched(), &["base=main"]);
        assert_eq!(report.unmatched(), &["#files<3"]);
        assert_eq!(report.duration(), Duration::from_nanos(500));
    }

    #[test]
    fn report_display() {
        let report = EvaluationReport::new(
            vec!["base=main".into(), "-draft".into()],
            vec![],
            Duration::from_nanos(100),
        );
        let s = report.to_string();
        assert!(s.starts_with("passed: true"));
        assert!(s.contains("matched: [base=main, -draft]"));
        assert!(s.contains("unmatched: []"));
    }
}
