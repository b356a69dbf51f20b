//! Pull request policy conditions and branch rule documents.
//!
//! Two independent pipelines live here:
//!
//! - [`parse`] turns a search-style expression such as `-label=wip` or
//!   `#approved-reviews-by>=2` into a [`Condition`], which can be evaluated
//!   against any [`FactProvider`].
//! - [`rules`] merges a default rule document with per-branch overrides and
//!   validates the result before decoding it into a typed [`rules::Rule`].

mod error;
mod evaluate;
pub mod parse;
pub mod rules;
mod types;

pub use error::Error;
pub use types::{
    attr, count, current_time, flag, Attribute, AttributeExpr, BuildResult, CompileError,
    Condition, ConditionSet, EvaluationReport, FactProvider, Facts, Operator, Pattern, Value,
    ValueGrammar,
};
