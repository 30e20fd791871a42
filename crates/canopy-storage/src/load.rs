//! Consolidation load pipeline: read existing, reconcile, re-resolve, write

use std::collections::HashMap;

use crate::error::StorageResult;
use crate::model::{ConsolidationBatch, ElementId, StoredEdge};
use crate::traits::HierarchyStore;
use canopy_core::{
    ConsolidationMode, Edge, LoadSemantic, ReconcileStats, ReconcileWarning, Reconciler,
};
use serde::Serialize;

/// Summary of one consolidation load
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub dimension: String,
    pub mode: ConsolidationMode,
    pub semantic: LoadSemantic,
    pub stats: ReconcileStats,
    /// Parents whose last child was deleted
    pub emptied: Vec<String>,
    pub warnings: Vec<ReconcileWarning>,
}

/// Loads an edge stream into a stored dimension
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolidationLoad {
    pub mode: ConsolidationMode,
    pub semantic: LoadSemantic,
}

impl ConsolidationLoad {
    pub fn new(mode: ConsolidationMode, semantic: LoadSemantic) -> Self {
        Self { mode, semantic }
    }

    pub async fn run<S>(
        &self,
        store: &S,
        dimension: &str,
        source: &[Edge],
    ) -> StorageResult<LoadReport>
    where
        S: HierarchyStore + ?Sized,
    {
        let target = store.load_forest(dimension, true).await?;
        let outcome = Reconciler::new(self.mode, self.semantic).reconcile(&target, source)?;
        let mut warnings = outcome.warnings;
        let mut stats = outcome.stats;

        // Element ids are resolved after reconciling; rows may have moved in between.
        let ids: HashMap<String, ElementId> = store
            .get_elements(dimension)
            .await?
            .into_iter()
            .map(|s| (s.element.name, s.id))
            .collect();

        let mut batch = ConsolidationBatch::default();
        for edge in outcome.edges {
            let parent = ids.get(&edge.parent);
            let child = ids.get(&edge.child);
            match (parent, child) {
                (Some(&parent), Some(&child)) => batch.edges.push(StoredEdge {
                    parent,
                    child,
                    weight: edge.weight,
                }),
                _ => {
                    let missing = if parent.is_none() { &edge.parent } else { &edge.child };
                    let warning = ReconcileWarning::UnknownElement {
                        parent: edge.parent.clone(),
                        child: edge.child.clone(),
                        missing: missing.clone(),
                    };
                    tracing::warn!(dimension, "{}", warning);
                    warnings.push(warning);
                    stats.skipped += 1;
                }
            }
        }
        stats.after = batch.edges.len();
        batch.emptied = outcome
            .emptied
            .iter()
            .filter_map(|name| ids.get(name).copied())
            .collect();

        store.write_consolidations(dimension, &batch).await?;
        tracing::info!(
            dimension,
            mode = %self.mode,
            semantic = %self.semantic,
            before = stats.existing,
            source = stats.from_source,
            after = stats.after,
            "Consolidation load finished"
        );

        Ok(LoadReport {
            dimension: dimension.to_string(),
            mode: self.mode,
            semantic: self.semantic,
            stats,
            emptied: outcome.emptied,
            warnings,
        })
    }
}
