//! Canopy Core - hierarchy filtering and consolidation reconciliation
//!
//! This crate holds the pure, synchronous algorithms of Canopy: the element
//! forest model, the filter engine that partitions a dimension into accepted
//! and denied elements, and the reconciler that merges incoming parent/child
//! edges into an existing hierarchy.

pub mod consolidation;
pub mod edge;
pub mod element;
pub mod error;
pub mod filter;
pub mod forest;
pub mod limits;

pub use consolidation::{
    reconcile, ConsolidationMode, LoadSemantic, ReconcileOutcome, ReconcileStats, ReconcileWarning,
    Reconciler,
};
pub use edge::Edge;
pub use element::{AttributeValue, Element, ElementKind};
pub use error::{Error, Result};
pub use filter::{
    evaluate, Combinator, FilterAction, FilterCondition, FilterDefinition, FilterEngine,
    FilterResult, FilterState, FilterWarning, LogicalOperator, Predicate, Propagation,
};
pub use forest::Forest;
pub use limits::ValidationError;
