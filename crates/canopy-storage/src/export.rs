//! Whole-dimension export and import documents

use crate::error::{StorageError, StorageResult};
use crate::load::{ConsolidationLoad, LoadReport};
use crate::model::Dimension;
use crate::traits::HierarchyStore;
use canopy_core::{Edge, Element};
use serde::{Deserialize, Serialize};

/// Export format version
pub const EXPORT_VERSION: &str = "1";

/// A stored dimension as plain elements and named edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyExport {
    pub version: String,
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Snapshot a dimension, elements in insertion order and edges in write order
pub async fn export_dimension<S>(store: &S, dimension: &str) -> StorageResult<HierarchyExport>
where
    S: HierarchyStore + ?Sized,
{
    let record = store
        .get_dimension(dimension)
        .await?
        .ok_or_else(|| StorageError::DimensionNotFound(dimension.to_string()))?;
    let forest = store.load_forest(dimension, true).await?;

    tracing::info!(
        dimension,
        elements = forest.len(),
        edges = forest.edge_count(),
        "Exported dimension"
    );

    Ok(HierarchyExport {
        version: EXPORT_VERSION.to_string(),
        dimension: record.name,
        description: record.description,
        edges: store_edge_order(store, dimension, &forest).await?,
        elements: forest.elements().cloned().collect(),
    })
}

/// Create the dimension if needed, upsert its elements, then load its edges
pub async fn import_dimension<S>(
    store: &S,
    data: &HierarchyExport,
    load: ConsolidationLoad,
) -> StorageResult<LoadReport>
where
    S: HierarchyStore + ?Sized,
{
    if data.version != EXPORT_VERSION {
        tracing::warn!(version = %data.version, "Unrecognized export version, importing anyway");
    }
    if store.get_dimension(&data.dimension).await?.is_none() {
        let mut dimension = Dimension::new(&data.dimension);
        dimension.description = data.description.clone();
        store.save_dimension(&dimension).await?;
    }
    store.save_elements(&data.dimension, &data.elements).await?;
    load.run(store, &data.dimension, &data.edges).await
}

async fn store_edge_order<S>(
    store: &S,
    dimension: &str,
    forest: &canopy_core::Forest,
) -> StorageResult<Vec<Edge>>
where
    S: HierarchyStore + ?Sized,
{
    let names: std::collections::HashMap<_, _> = store
        .get_elements(dimension)
        .await?
        .into_iter()
        .map(|s| (s.id, s.element.name))
        .collect();
    let mut edges = Vec::with_capacity(forest.edge_count());
    for stored in store.get_edges(dimension).await? {
        if let (Some(parent), Some(child)) = (names.get(&stored.parent), names.get(&stored.child)) {
            edges.push(Edge::new(parent.clone(), child.clone()).with_weight(stored.weight));
        }
    }
    Ok(edges)
}
