//! Consolidation reconciliation: merge edge streams under uniqueness invariants

mod edge_set;
mod mode;
mod reconciler;

pub use edge_set::{EdgeIdentity, EdgeSet};
pub use mode::{ConsolidationMode, LoadSemantic};
pub use reconciler::{
    reconcile, ReconcileOutcome, ReconcileStats, ReconcileWarning, Reconciler, PROGRESS_INTERVAL,
};
