//! Canopy Storage - Hierarchy stores and the consolidation load pipeline
//!
//! A store holds named dimensions, each with its elements and consolidation
//! edges. [`ConsolidationLoad`] reads a dimension, merges an edge stream into
//! it with the core reconciler, and writes the result back in one batch.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod export;
pub mod load;
pub mod migration;
pub mod model;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use export::{export_dimension, import_dimension, HierarchyExport, EXPORT_VERSION};
pub use load::{ConsolidationLoad, LoadReport};
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION};
pub use model::{ConsolidationBatch, Dimension, ElementId, StoredEdge, StoredElement};
pub use traits::HierarchyStore;

#[cfg(feature = "redb")]
pub use redb::RedbStore;

pub use memory::MemoryStore;
