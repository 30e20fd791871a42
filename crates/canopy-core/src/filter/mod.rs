//! Element selection: ordered accept/deny conditions with hierarchical propagation

mod condition;
mod engine;
mod predicate;
mod state;

pub use condition::{
    Combinator, ConditionList, FilterAction, FilterCondition, FilterDefinition, LogicalOperator,
    Propagation,
};
pub use engine::{evaluate, FilterEngine, FilterResult, FilterWarning};
pub use predicate::{Comparison, Matcher, Predicate};
pub use state::FilterState;
