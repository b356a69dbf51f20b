mod attribute;
mod condition;
mod condition_set;
mod error;
mod evaluation_report;
mod facts;
mod value;

pub use attribute::{Attribute, ValueGrammar};
pub use condition::{
    attr, count, current_time, flag, AttributeExpr, BuildResult, Condition, Operator,
};
pub use condition_set::ConditionSet;
pub use error::CompileError;
pub use evaluation_report::EvaluationReport;
pub use facts::{FactProvider, Facts};
pub use value::{Pattern, Value};
