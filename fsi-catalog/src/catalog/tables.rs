// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Generic table catalog
//!
//! Holds ordinary tables, views and the catalog-level entry of every
//! foreign table in the `omnisci_tables` system table. This table is base
//! schema: it exists whether or not foreign storage is enabled.

use super::TABLES_TABLE;
use crate::error::{CatalogError, CatalogResult};
use crate::store::{id_key, key_id, MetadataStore, SharedStore, StoreOp};
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    Table,
    View,
    ForeignTable,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Table => "Table",
            TableKind::View => "View",
            TableKind::ForeignTable => "Foreign table",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// Row of `omnisci_tables`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_id: u32,
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnDescriptor>,
    /// Defining query of a view; not validated against other tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_sql: Option<String>,
    pub owner_id: i32,
}

impl TableDescriptor {
    pub fn is_view(&self) -> bool {
        self.kind == TableKind::View
    }

    pub fn is_foreign(&self) -> bool {
        self.kind == TableKind::ForeignTable
    }
}

pub struct TableCatalog {
    shared: Arc<SharedStore>,
    cache: RwLock<HashMap<String, Arc<TableDescriptor>>>,
}

impl TableCatalog {
    pub(crate) fn new(shared: Arc<SharedStore>) -> Self {
        Self {
            shared,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn store(&self) -> &dyn MetadataStore {
        self.shared.store().as_ref()
    }

    /// Create `omnisci_tables` if the store is new
    pub(crate) fn ensure_schema(&self) -> CatalogResult<bool> {
        if self.store().table_exists(TABLES_TABLE)? {
            return Ok(false);
        }
        self.store().execute(&[StoreOp::create_table(TABLES_TABLE)])?;
        info!("Created system table {}", TABLES_TABLE);
        Ok(true)
    }

    /// Replace the cache with the rows currently in the store
    pub(crate) fn load(&self) -> CatalogResult<usize> {
        let rows = self.scan_store()?;
        let mut cache = self.cache.write();
        cache.clear();
        for row in rows {
            cache.insert(row.name.clone(), Arc::new(row));
        }
        debug!("Loaded {} table descriptors", cache.len());
        Ok(cache.len())
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.write().clear();
    }

    pub(crate) fn scan_store(&self) -> CatalogResult<Vec<TableDescriptor>> {
        self.store()
            .scan(TABLES_TABLE)?
            .into_iter()
            .map(|(_, value)| Ok(serde_json::from_slice(&value)?))
            .collect()
    }

    /// Look a table up by name directly in the store
    pub(crate) fn find_in_store(&self, name: &str) -> CatalogResult<Option<TableDescriptor>> {
        Ok(self.scan_store()?.into_iter().find(|t| t.name == name))
    }

    pub(crate) fn next_table_id(&self) -> CatalogResult<u32> {
        match self.store().last_key(TABLES_TABLE)? {
            Some(key) => Ok(key_id(&key)? + 1),
            None => Ok(1),
        }
    }

    pub(crate) fn put_op(descriptor: &TableDescriptor) -> CatalogResult<StoreOp> {
        Ok(StoreOp::put(
            TABLES_TABLE,
            id_key(descriptor.table_id),
            serde_json::to_vec(descriptor)?,
        ))
    }

    pub(crate) fn delete_op(table_id: u32) -> StoreOp {
        StoreOp::delete(TABLES_TABLE, id_key(table_id))
    }

    pub(crate) fn cache_insert(&self, descriptor: Arc<TableDescriptor>) {
        self.cache
            .write()
            .insert(descriptor.name.clone(), descriptor);
    }

    pub(crate) fn cache_evict_ids(&self, table_ids: &[u32]) {
        self.cache
            .write()
            .retain(|_, descriptor| !table_ids.contains(&descriptor.table_id));
    }

    /// Fail with `DuplicateName` if any table, view or foreign table uses `name`
    pub(crate) fn ensure_name_available(&self, name: &str) -> CatalogResult<()> {
        match self.find_in_store(name)? {
            Some(existing) => Err(CatalogError::duplicate(existing.kind.label(), name)),
            None => Ok(()),
        }
    }

    fn create(
        &self,
        name: &str,
        kind: TableKind,
        columns: Vec<ColumnDescriptor>,
        view_sql: Option<String>,
        owner_id: i32,
    ) -> CatalogResult<Arc<TableDescriptor>> {
        let _guard = self.shared.ddl_lock().lock();
        self.ensure_name_available(name)?;

        let descriptor = TableDescriptor {
            table_id: self.next_table_id()?,
            name: name.to_string(),
            kind,
            columns,
            view_sql,
            owner_id,
        };
        self.store().execute(&[Self::put_op(&descriptor)?])?;

        let descriptor = Arc::new(descriptor);
        self.cache_insert(descriptor.clone());
        info!(
            "Created {} '{}' (id {})",
            kind.label().to_lowercase(),
            name,
            descriptor.table_id
        );
        Ok(descriptor)
    }

    pub fn create_table(
        &self,
        name: &str,
        columns: Vec<ColumnDescriptor>,
        owner_id: i32,
    ) -> CatalogResult<Arc<TableDescriptor>> {
        self.create(name, TableKind::Table, columns, None, owner_id)
    }

    /// Create a view; the query text is stored as given
    pub fn create_view(
        &self,
        name: &str,
        view_sql: &str,
        owner_id: i32,
    ) -> CatalogResult<Arc<TableDescriptor>> {
        self.create(
            name,
            TableKind::View,
            Vec::new(),
            Some(view_sql.to_string()),
            owner_id,
        )
    }

    /// Drop an ordinary table or view
    ///
    /// Foreign tables are dropped through the foreign table registry.
    pub fn drop_table(&self, name: &str) -> CatalogResult<()> {
        let _guard = self.shared.ddl_lock().lock();
        let existing = self
            .find_in_store(name)?
            .filter(|t| !t.is_foreign())
            .ok_or_else(|| CatalogError::not_found("Table", name))?;

        self.store().execute(&[Self::delete_op(existing.table_id)])?;
        self.cache_evict_ids(&[existing.table_id]);
        info!("Dropped {} '{}'", existing.kind.label().to_lowercase(), name);
        Ok(())
    }

    pub fn get_metadata_for_table(&self, name: &str) -> Option<Arc<TableDescriptor>> {
        self.cache.read().get(name).cloned()
    }

    pub fn get_metadata_for_table_id(&self, table_id: u32) -> Option<Arc<TableDescriptor>> {
        self.cache
            .read()
            .values()
            .find(|t| t.table_id == table_id)
            .cloned()
    }

    /// All cached descriptors ordered by id
    pub fn list(&self) -> Vec<Arc<TableDescriptor>> {
        let mut tables: Vec<_> = self.cache.read().values().cloned().collect();
        tables.sort_by_key(|t| t.table_id);
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{open_shared, StorageType};
    use tempfile::TempDir;

    fn catalog(dir: &TempDir) -> TableCatalog {
        let shared = open_shared(dir.path(), StorageType::Memory).unwrap();
        let tables = TableCatalog::new(shared);
        tables.ensure_schema().unwrap();
        tables
    }

    #[test]
    fn test_create_and_lookup() {
        let dir = TempDir::new().unwrap();
        let tables = catalog(&dir);

        let t = tables
            .create_table("test_table", vec![ColumnDescriptor::new("c1", "INT")], 0)
            .unwrap();
        let v = tables
            .create_view("test_view", "SELECT * FROM test_table;", 0)
            .unwrap();

        assert_eq!(t.table_id, 1);
        assert_eq!(v.table_id, 2);
        assert!(v.is_view());
        assert_eq!(
            tables.get_metadata_for_table("test_table").unwrap().columns[0].name,
            "c1"
        );
        assert_eq!(tables.get_metadata_for_table_id(2).unwrap().name, "test_view");
    }

    #[test]
    fn test_names_are_shared_between_tables_and_views() {
        let dir = TempDir::new().unwrap();
        let tables = catalog(&dir);

        tables.create_table("dup", Vec::new(), 0).unwrap();
        let err = tables.create_view("dup", "SELECT 1;", 0).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateName { kind: "Table", ref name } if name == "dup"
        ));
    }

    #[test]
    fn test_drop_and_reload() {
        let dir = TempDir::new().unwrap();
        let tables = catalog(&dir);

        tables.create_table("a", Vec::new(), 0).unwrap();
        tables.create_table("b", Vec::new(), 0).unwrap();
        tables.drop_table("a").unwrap();
        assert!(tables.get_metadata_for_table("a").is_none());
        assert!(matches!(
            tables.drop_table("a"),
            Err(CatalogError::NotFound { .. })
        ));

        tables.clear_cache();
        assert_eq!(tables.load().unwrap(), 1);
        assert!(tables.get_metadata_for_table("b").is_some());
    }
}
