//! ReDB hierarchy store

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::model::{
    validate_dimension_name, ConsolidationBatch, Dimension, ElementId, StoredEdge, StoredElement,
};
use crate::traits::{check_batch, HierarchyStore};
use async_trait::async_trait;
use canopy_core::Element;
use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Mutex;

// Table definitions. Row keys are "<dimension>:<sequence>" so a prefix range
// returns one dimension's rows in insertion order.
const DIMENSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("dimensions");
const ELEMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("elements");
const EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// ReDB hierarchy store
pub struct RedbStore {
    db: Mutex<Database>,
}

impl RedbStore {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;
        let store = Self { db: Mutex::new(db) };
        store.migrate_to_latest()?;
        Ok(store)
    }

    fn row_prefix(dimension: &str) -> String {
        format!("{}:", dimension)
    }

    fn row_key(dimension: &str, seq: u64) -> String {
        format!("{}:{:012}", dimension, seq)
    }

    fn seq_of(key: &str) -> u64 {
        key.rsplit(':').next().and_then(|s| s.parse().ok()).unwrap_or(0)
    }

    fn read_rows<T, R>(table: &R, dimension: &str) -> StorageResult<Vec<(String, T)>>
    where
        T: DeserializeOwned,
        R: ReadableTable<&'static str, &'static [u8]>,
    {
        let prefix = Self::row_prefix(dimension);
        let mut rows = Vec::new();
        for entry in table.range(prefix.as_str()..)? {
            let (key, value) = entry?;
            let key = key.value();
            if !key.starts_with(&prefix) {
                break;
            }
            rows.push((key.to_string(), serde_json::from_slice(value.value())?));
        }
        Ok(rows)
    }

    fn require_dimension<R>(table: &R, name: &str) -> StorageResult<Dimension>
    where
        R: ReadableTable<&'static str, &'static [u8]>,
    {
        match table.get(name)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::DimensionNotFound(name.to_string())),
        }
    }

    fn remove_rows(
        table: &mut redb::Table<'_, &'static str, &'static [u8]>,
        dimension: &str,
    ) -> StorageResult<usize> {
        let keys: Vec<String> = Self::read_rows::<serde_json::Value, _>(&*table, dimension)?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            table.remove(key.as_str())?;
        }
        Ok(keys.len())
    }
}

impl Migratable for RedbStore {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let read_txn = db.begin_read()?;
        let table = match read_txn.open_table(META) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let version = table.get(SCHEMA_VERSION_KEY)?.map(|v| v.value()).unwrap_or(0);
        u32::try_from(version).map_err(|e| StorageError::Migration(e.to_string()))
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(META)?;
            table.insert(SCHEMA_VERSION_KEY, u64::from(version))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            1 => {
                let db = self.db.lock().map_err(StorageError::lock)?;
                let write_txn = db.begin_write()?;
                {
                    write_txn.open_table(DIMENSIONS)?;
                    write_txn.open_table(ELEMENTS)?;
                    write_txn.open_table(EDGES)?;
                    write_txn.open_table(META)?;
                }
                write_txn.commit()?;
                Ok(())
            }
            other => Err(StorageError::Migration(format!("Unknown schema version {}", other))),
        }
    }
}

#[async_trait]
impl HierarchyStore for RedbStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let read_txn = db.begin_read()?;
        read_txn.open_table(DIMENSIONS)?;
        Ok(true)
    }

    async fn save_dimension(&self, dimension: &Dimension) -> StorageResult<()> {
        validate_dimension_name(&dimension.name)?;
        let value = serde_json::to_vec(dimension)?;

        let db = self.db.lock().map_err(StorageError::lock)?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DIMENSIONS)?;
            table.insert(dimension.name.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn get_dimension(&self, name: &str) -> StorageResult<Option<Dimension>> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DIMENSIONS)?;

        if let Some(value) = table.get(name)? {
            Ok(Some(serde_json::from_slice(value.value())?))
        } else {
            Ok(None)
        }
    }

    async fn list_dimensions(&self) -> StorageResult<Vec<Dimension>> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DIMENSIONS)?;

        let mut dimensions = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            dimensions.push(serde_json::from_slice(value.value())?);
        }
        Ok(dimensions)
    }

    async fn delete_dimension(&self, name: &str) -> StorageResult<()> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let write_txn = db.begin_write()?;
        {
            let mut dimensions = write_txn.open_table(DIMENSIONS)?;
            if dimensions.remove(name)?.is_none() {
                return Err(StorageError::DimensionNotFound(name.to_string()));
            }
            let mut elements = write_txn.open_table(ELEMENTS)?;
            let removed_elements = Self::remove_rows(&mut elements, name)?;
            let mut edges = write_txn.open_table(EDGES)?;
            let removed_edges = Self::remove_rows(&mut edges, name)?;
            tracing::debug!(
                dimension = name,
                elements = removed_elements,
                edges = removed_edges,
                "Deleted dimension"
            );
        }
        write_txn.commit()?;

        Ok(())
    }

    async fn save_elements(
        &self,
        dimension: &str,
        elements: &[Element],
    ) -> StorageResult<Vec<StoredElement>> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let write_txn = db.begin_write()?;
        let mut saved = Vec::with_capacity(elements.len());
        {
            let mut dimensions = write_txn.open_table(DIMENSIONS)?;
            let mut record = Self::require_dimension(&dimensions, dimension)?;

            let mut table = write_txn.open_table(ELEMENTS)?;
            let rows: Vec<(String, StoredElement)> = Self::read_rows(&table, dimension)?;
            let mut next_seq = rows.last().map(|(key, _)| Self::seq_of(key) + 1).unwrap_or(0);
            let mut by_name: std::collections::HashMap<String, (String, ElementId)> = rows
                .into_iter()
                .map(|(key, s)| (s.element.name, (key, s.id)))
                .collect();

            for element in elements {
                canopy_core::limits::validate_element_name(&element.name)
                    .map_err(canopy_core::Error::from)?;
                let (key, id) = match by_name.get(&element.name) {
                    Some((key, id)) => (key.clone(), *id),
                    None => {
                        let key = Self::row_key(dimension, next_seq);
                        next_seq += 1;
                        let id = ElementId::new();
                        by_name.insert(element.name.clone(), (key.clone(), id));
                        (key, id)
                    }
                };
                let stored = StoredElement {
                    id,
                    element: element.clone(),
                };
                let value = serde_json::to_vec(&stored)?;
                table.insert(key.as_str(), value.as_slice())?;
                saved.push(stored);
            }

            record.touch();
            let value = serde_json::to_vec(&record)?;
            dimensions.insert(dimension, value.as_slice())?;
        }
        write_txn.commit()?;

        Ok(saved)
    }

    async fn get_elements(&self, dimension: &str) -> StorageResult<Vec<StoredElement>> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let read_txn = db.begin_read()?;
        Self::require_dimension(&read_txn.open_table(DIMENSIONS)?, dimension)?;
        let table = read_txn.open_table(ELEMENTS)?;

        Ok(Self::read_rows(&table, dimension)?
            .into_iter()
            .map(|(_, stored)| stored)
            .collect())
    }

    async fn get_edges(&self, dimension: &str) -> StorageResult<Vec<StoredEdge>> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let read_txn = db.begin_read()?;
        Self::require_dimension(&read_txn.open_table(DIMENSIONS)?, dimension)?;
        let table = read_txn.open_table(EDGES)?;

        Ok(Self::read_rows(&table, dimension)?
            .into_iter()
            .map(|(_, edge)| edge)
            .collect())
    }

    async fn write_consolidations(
        &self,
        dimension: &str,
        batch: &ConsolidationBatch,
    ) -> StorageResult<()> {
        let db = self.db.lock().map_err(StorageError::lock)?;
        let write_txn = db.begin_write()?;
        {
            let mut dimensions = write_txn.open_table(DIMENSIONS)?;
            let mut record = Self::require_dimension(&dimensions, dimension)?;

            let elements: Vec<StoredElement> = Self::read_rows(&write_txn.open_table(ELEMENTS)?, dimension)?
                .into_iter()
                .map(|(_, stored)| stored)
                .collect();
            check_batch(dimension, &elements, batch)?;

            let mut table = write_txn.open_table(EDGES)?;
            let removed = Self::remove_rows(&mut table, dimension)?;
            for (seq, edge) in batch.edges.iter().enumerate() {
                let key = Self::row_key(dimension, seq as u64);
                let value = serde_json::to_vec(edge)?;
                table.insert(key.as_str(), value.as_slice())?;
            }

            record.touch();
            let value = serde_json::to_vec(&record)?;
            dimensions.insert(dimension, value.as_slice())?;

            tracing::debug!(
                dimension,
                removed,
                written = batch.edges.len(),
                emptied = batch.emptied.len(),
                "Wrote consolidations"
            );
        }
        write_txn.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::Edge;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        let store = RedbStore::open(&db_path).unwrap();
        store.initialize().await.unwrap();
        assert!(store.health_check().await.unwrap());

        // Create a dimension
        store.save_dimension(&Dimension::new("Regions")).await.unwrap();

        // Add elements
        let saved = store
            .save_elements(
                "Regions",
                &[Element::new("World"), Element::new("Europe"), Element::new("Asia")],
            )
            .await
            .unwrap();

        // Write consolidations
        let batch = ConsolidationBatch {
            edges: vec![
                StoredEdge { parent: saved[0].id, child: saved[1].id, weight: 1.0 },
                StoredEdge { parent: saved[0].id, child: saved[2].id, weight: 2.0 },
            ],
            emptied: Vec::new(),
        };
        store.write_consolidations("Regions", &batch).await.unwrap();

        let forest = store.load_forest("Regions", true).await.unwrap();
        assert_eq!(forest.roots(), vec!["World"]);
        assert_eq!(forest.edges()[1], Edge::new("World", "Asia").with_weight(2.0));

        // Replacing the batch drops edges not in it
        let batch = ConsolidationBatch {
            edges: vec![StoredEdge { parent: saved[0].id, child: saved[2].id, weight: 1.0 }],
            emptied: Vec::new(),
        };
        store.write_consolidations("Regions", &batch).await.unwrap();
        assert_eq!(store.get_edges("Regions").await.unwrap().len(), 1);

        // Delete the dimension
        store.delete_dimension("Regions").await.unwrap();
        assert!(store.get_dimension("Regions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dimensions_do_not_share_rows() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.save_dimension(&Dimension::new("A")).await.unwrap();
        store.save_dimension(&Dimension::new("AB")).await.unwrap();
        store.save_elements("A", &[Element::new("x")]).await.unwrap();
        store
            .save_elements("AB", &[Element::new("y"), Element::new("z")])
            .await
            .unwrap();

        assert_eq!(store.get_elements("A").await.unwrap().len(), 1);
        assert_eq!(store.get_elements("AB").await.unwrap().len(), 2);

        store.delete_dimension("A").await.unwrap();
        assert_eq!(store.get_elements("AB").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data_and_order() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");
        {
            let store = RedbStore::open(&db_path).unwrap();
            store.save_dimension(&Dimension::new("Regions")).await.unwrap();
            store
                .save_elements("Regions", &[Element::new("b"), Element::new("a")])
                .await
                .unwrap();
        }

        let store = RedbStore::open(&db_path).unwrap();
        assert_eq!(store.get_schema_version().unwrap(), crate::migration::CURRENT_VERSION);
        let names: Vec<String> = store
            .get_elements("Regions")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.element.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
