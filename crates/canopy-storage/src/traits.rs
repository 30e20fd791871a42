//! Hierarchy store trait definitions

use std::collections::HashMap;

use crate::error::{StorageError, StorageResult};
use crate::model::{ConsolidationBatch, Dimension, ElementId, StoredEdge, StoredElement};
use async_trait::async_trait;
use canopy_core::{Element, Forest};

/// Trait for hierarchy store implementations
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Dimension Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a dimension record, replacing one with the same name
    async fn save_dimension(&self, dimension: &Dimension) -> StorageResult<()>;

    /// Get a dimension by name
    async fn get_dimension(&self, name: &str) -> StorageResult<Option<Dimension>>;

    /// All dimensions, ordered by name
    async fn list_dimensions(&self) -> StorageResult<Vec<Dimension>>;

    /// Delete a dimension with its elements and consolidations
    async fn delete_dimension(&self, name: &str) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Element Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Upsert elements by name; existing elements keep their id and position
    async fn save_elements(
        &self,
        dimension: &str,
        elements: &[Element],
    ) -> StorageResult<Vec<StoredElement>>;

    /// All elements of a dimension in insertion order
    async fn get_elements(&self, dimension: &str) -> StorageResult<Vec<StoredElement>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Consolidation Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All consolidations of a dimension in write order
    async fn get_edges(&self, dimension: &str) -> StorageResult<Vec<StoredEdge>>;

    /// Atomically replace the dimension's consolidations with `batch.edges`
    async fn write_consolidations(
        &self,
        dimension: &str,
        batch: &ConsolidationBatch,
    ) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Materialize a dimension as a forest snapshot
    async fn load_forest(&self, dimension: &str, with_edges: bool) -> StorageResult<Forest> {
        if self.get_dimension(dimension).await?.is_none() {
            return Err(StorageError::DimensionNotFound(dimension.to_string()));
        }

        let stored = self.get_elements(dimension).await?;
        let names: HashMap<ElementId, String> = stored
            .iter()
            .map(|s| (s.id, s.element.name.clone()))
            .collect();

        let mut forest = Forest::new(dimension);
        for s in stored {
            forest.add_element(s.element)?;
        }

        if with_edges {
            for edge in self.get_edges(dimension).await? {
                let (Some(parent), Some(child)) = (names.get(&edge.parent), names.get(&edge.child)) else {
                    return Err(StorageError::Inconsistent {
                        dimension: dimension.to_string(),
                        message: format!("edge {} -> {} references a missing element", edge.parent, edge.child),
                    });
                };
                forest.add_edge(parent, child, edge.weight)?;
            }
        }

        tracing::debug!(
            dimension,
            elements = forest.len(),
            edges = forest.edge_count(),
            "Loaded forest"
        );
        Ok(forest)
    }
}

/// Check that every id in a batch belongs to the dimension's elements
pub(crate) fn check_batch(
    dimension: &str,
    elements: &[StoredElement],
    batch: &ConsolidationBatch,
) -> StorageResult<()> {
    let known: std::collections::HashSet<ElementId> = elements.iter().map(|s| s.id).collect();
    let referenced = batch
        .edges
        .iter()
        .flat_map(|e| [e.parent, e.child])
        .chain(batch.emptied.iter().copied());
    for id in referenced {
        if !known.contains(&id) {
            return Err(StorageError::Inconsistent {
                dimension: dimension.to_string(),
                message: format!("element {} does not exist", id),
            });
        }
    }
    Ok(())
}
