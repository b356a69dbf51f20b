//! Rule documents: layering a default rule with user and per-branch
//! overrides, and checking the result against the rule schema.
//!
//! The pipeline for one branch is: lenient check of the user document,
//! deep merge of the user `default` over [`DefaultRule`], merge of the first
//! matching branch override, strict check, decode into [`Rule`].

mod config;
mod document;
mod error;
mod merge;
mod schema;

pub use config::{BranchRule, DefaultRule, UserConfig};
pub use document::{Protection, RequiredPullRequestReviews, RequiredStatusChecks, Rule};
pub use error::{ConfigError, Issue, IssueKind, ValidationError};
pub use merge::merge;
pub use schema::{validate, KeyPath, Mode, Segment};
