//! In-memory hierarchy store for testing

use crate::error::{StorageError, StorageResult};
use crate::model::{
    validate_dimension_name, ConsolidationBatch, Dimension, ElementId, StoredEdge, StoredElement,
};
use crate::traits::{check_batch, HierarchyStore};
use async_trait::async_trait;
use canopy_core::Element;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct DimensionData {
    dimension: Dimension,
    elements: Vec<StoredElement>,
    edges: Vec<StoredEdge>,
}

/// In-memory hierarchy store
///
/// Useful for testing and temporary storage.
pub struct MemoryStore {
    dimensions: RwLock<BTreeMap<String, DimensionData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            dimensions: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HierarchyStore for MemoryStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    // Dimension operations

    async fn save_dimension(&self, dimension: &Dimension) -> StorageResult<()> {
        validate_dimension_name(&dimension.name)?;
        let mut dimensions = self.dimensions.write().map_err(StorageError::lock)?;
        match dimensions.get_mut(&dimension.name) {
            Some(data) => data.dimension = dimension.clone(),
            None => {
                dimensions.insert(
                    dimension.name.clone(),
                    DimensionData {
                        dimension: dimension.clone(),
                        elements: Vec::new(),
                        edges: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn get_dimension(&self, name: &str) -> StorageResult<Option<Dimension>> {
        let dimensions = self.dimensions.read().map_err(StorageError::lock)?;
        Ok(dimensions.get(name).map(|d| d.dimension.clone()))
    }

    async fn list_dimensions(&self) -> StorageResult<Vec<Dimension>> {
        let dimensions = self.dimensions.read().map_err(StorageError::lock)?;
        Ok(dimensions.values().map(|d| d.dimension.clone()).collect())
    }

    async fn delete_dimension(&self, name: &str) -> StorageResult<()> {
        let mut dimensions = self.dimensions.write().map_err(StorageError::lock)?;
        dimensions
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::DimensionNotFound(name.to_string()))
    }

    // Element operations

    async fn save_elements(
        &self,
        dimension: &str,
        elements: &[Element],
    ) -> StorageResult<Vec<StoredElement>> {
        let mut dimensions = self.dimensions.write().map_err(StorageError::lock)?;
        let data = dimensions
            .get_mut(dimension)
            .ok_or_else(|| StorageError::DimensionNotFound(dimension.to_string()))?;

        let mut saved = Vec::with_capacity(elements.len());
        for element in elements {
            canopy_core::limits::validate_element_name(&element.name)
                .map_err(canopy_core::Error::from)?;
            match data.elements.iter_mut().find(|s| s.element.name == element.name) {
                Some(existing) => {
                    existing.element = element.clone();
                    saved.push(existing.clone());
                }
                None => {
                    let stored = StoredElement {
                        id: ElementId::new(),
                        element: element.clone(),
                    };
                    data.elements.push(stored.clone());
                    saved.push(stored);
                }
            }
        }
        data.dimension.touch();
        Ok(saved)
    }

    async fn get_elements(&self, dimension: &str) -> StorageResult<Vec<StoredElement>> {
        let dimensions = self.dimensions.read().map_err(StorageError::lock)?;
        dimensions
            .get(dimension)
            .map(|d| d.elements.clone())
            .ok_or_else(|| StorageError::DimensionNotFound(dimension.to_string()))
    }

    // Consolidation operations

    async fn get_edges(&self, dimension: &str) -> StorageResult<Vec<StoredEdge>> {
        let dimensions = self.dimensions.read().map_err(StorageError::lock)?;
        dimensions
            .get(dimension)
            .map(|d| d.edges.clone())
            .ok_or_else(|| StorageError::DimensionNotFound(dimension.to_string()))
    }

    async fn write_consolidations(
        &self,
        dimension: &str,
        batch: &ConsolidationBatch,
    ) -> StorageResult<()> {
        let mut dimensions = self.dimensions.write().map_err(StorageError::lock)?;
        let data = dimensions
            .get_mut(dimension)
            .ok_or_else(|| StorageError::DimensionNotFound(dimension.to_string()))?;
        check_batch(dimension, &data.elements, batch)?;

        data.edges = batch.edges.clone();
        data.dimension.touch();
        tracing::debug!(
            dimension,
            edges = batch.edges.len(),
            emptied = batch.emptied.len(),
            "Wrote consolidations"
        );
        Ok(())
    }
}
