use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fully merged, strictly validated rule for one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub protection: Protection,

    /// Pull requests carrying this label are left alone.
    pub disabling_label: String,

    /// Label name to the branch a labelled pull request is backported to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automated_backport_labels: Option<BTreeMap<String, String>>,
}

/// Branch protection settings. Each section may be `null` to turn it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Protection {
    pub required_status_checks: Option<RequiredStatusChecks>,
    pub required_pull_request_reviews: Option<RequiredPullRequestReviews>,
    /// Only `null` or an empty list is accepted.
    pub restrictions: Option<Vec<String>>,
    pub enforce_admins: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging.
    pub strict: bool,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequiredPullRequestReviews {
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
    /// Between 1 and 6.
    pub required_approving_review_count: u8,
}

impl Rule {
    /// The backport target for a label, if one is configured.
    #[must_use]
    pub fn backport_branch(&self, label: &str) -> Option<&str> {
        self.automated_backport_labels
            .as_ref()
            .and_then(|labels| labels.get(label))
            .map(String::as_str)
    }
}
