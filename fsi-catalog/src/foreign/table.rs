// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Foreign table registry
//!
//! A foreign table is a generic `omnisci_tables` entry of kind
//! `ForeignTable` plus an `omnisci_foreign_tables` row binding it to a
//! server. Both rows are always written and removed in one batch.

use super::options::ForeignOptions;
use super::server::{scan_foreign_table_rows, ForeignServerRegistry, ForeignTableRow};
use crate::catalog::{
    ColumnDescriptor, TableCatalog, TableDescriptor, TableKind, FOREIGN_TABLES_TABLE,
};
use crate::error::{CatalogError, CatalogResult};
use crate::store::{id_key, MetadataStore, SharedStore, StoreOp};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignTable {
    pub table_id: u32,
    pub name: String,
    pub server_id: u32,
    pub columns: Vec<ColumnDescriptor>,
    pub options: ForeignOptions,
}

pub struct ForeignTableRegistry {
    shared: Arc<SharedStore>,
    tables: Arc<TableCatalog>,
    servers: Arc<ForeignServerRegistry>,
    cache: RwLock<HashMap<String, Arc<ForeignTable>>>,
}

impl ForeignTableRegistry {
    pub(crate) fn new(
        shared: Arc<SharedStore>,
        tables: Arc<TableCatalog>,
        servers: Arc<ForeignServerRegistry>,
    ) -> Self {
        Self {
            shared,
            tables,
            servers,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn store(&self) -> &dyn MetadataStore {
        self.shared.store().as_ref()
    }

    /// Replace the cache with the rows currently in the store
    ///
    /// Requires the table catalog and server registry to be loaded first.
    pub(crate) fn load(&self) -> CatalogResult<usize> {
        let rows = scan_foreign_table_rows(self.store())?;
        let mut cache = self.cache.write();
        cache.clear();

        for row in rows {
            let Some(descriptor) = self.tables.get_metadata_for_table_id(row.table_id) else {
                warn!(
                    "Foreign table row {} has no catalog table entry; skipping",
                    row.table_id
                );
                continue;
            };
            if self.servers.get_by_id(row.server_id).is_none() {
                warn!(
                    "Foreign table '{}' references missing server id {}",
                    descriptor.name, row.server_id
                );
            }
            let table = ForeignTable {
                table_id: row.table_id,
                name: descriptor.name.clone(),
                server_id: row.server_id,
                columns: descriptor.columns.clone(),
                options: ForeignOptions::from_json_str(&row.options)?,
            };
            cache.insert(table.name.clone(), Arc::new(table));
        }

        debug!("Loaded {} foreign tables", cache.len());
        Ok(cache.len())
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Create a foreign table bound to the server named `server_name`
    pub fn create(
        &self,
        name: &str,
        server_name: &str,
        columns: Vec<ColumnDescriptor>,
        options: ForeignOptions,
        owner_id: i32,
    ) -> CatalogResult<Arc<ForeignTable>> {
        let _guard = self.shared.ddl_lock().lock();
        self.tables.ensure_name_available(name)?;

        let server = self
            .servers
            .get_skip_cache(server_name)?
            .ok_or_else(|| CatalogError::UnknownServer(server_name.to_string()))?;
        server
            .data_wrapper
            .descriptor()
            .validate_table_options(&options)?;

        let descriptor = TableDescriptor {
            table_id: self.tables.next_table_id()?,
            name: name.to_string(),
            kind: TableKind::ForeignTable,
            columns,
            view_sql: None,
            owner_id,
        };
        let row = ForeignTableRow {
            table_id: descriptor.table_id,
            server_id: server.id,
            options: options.to_json_string()?,
        };
        self.store().execute(&[
            TableCatalog::put_op(&descriptor)?,
            StoreOp::put(
                FOREIGN_TABLES_TABLE,
                id_key(row.table_id),
                serde_json::to_vec(&row)?,
            ),
        ])?;

        let table = Arc::new(ForeignTable {
            table_id: descriptor.table_id,
            name: name.to_string(),
            server_id: server.id,
            columns: descriptor.columns.clone(),
            options,
        });
        self.tables.cache_insert(Arc::new(descriptor));
        self.cache.write().insert(name.to_string(), table.clone());
        info!(
            "Created foreign table '{}' (id {}) on server '{}'",
            name, table.table_id, server_name
        );
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ForeignTable>> {
        self.cache.read().get(name).cloned()
    }

    /// All cached foreign tables ordered by id
    pub fn list(&self) -> Vec<Arc<ForeignTable>> {
        let mut tables: Vec<_> = self.cache.read().values().cloned().collect();
        tables.sort_by_key(|t| t.table_id);
        tables
    }

    pub fn drop(&self, name: &str) -> CatalogResult<()> {
        let _guard = self.shared.ddl_lock().lock();
        let descriptor = self
            .tables
            .find_in_store(name)?
            .filter(TableDescriptor::is_foreign)
            .ok_or_else(|| CatalogError::not_found("Foreign table", name))?;

        self.store().execute(&[
            TableCatalog::delete_op(descriptor.table_id),
            StoreOp::delete(FOREIGN_TABLES_TABLE, id_key(descriptor.table_id)),
        ])?;
        self.evict(&[descriptor.table_id]);
        info!("Dropped foreign table '{}'", name);
        Ok(())
    }

    /// First phase of the disable cascade: ids of every foreign table
    ///
    /// Includes FSI rows and catalog entries of kind `ForeignTable`, so an
    /// entry whose partner row went missing is still collected.
    pub fn collect_for_disabled_feature(&self) -> CatalogResult<Vec<u32>> {
        let mut ids: BTreeSet<u32> = self
            .tables
            .scan_store()?
            .into_iter()
            .filter(TableDescriptor::is_foreign)
            .map(|t| t.table_id)
            .collect();

        if self.store().table_exists(FOREIGN_TABLES_TABLE)? {
            ids.extend(
                scan_foreign_table_rows(self.store())?
                    .into_iter()
                    .map(|row| row.table_id),
            );
        }
        Ok(ids.into_iter().collect())
    }

    /// Remove every foreign table while leaving tables and views untouched
    ///
    /// Views whose query selects from a removed foreign table are kept as-is.
    pub(crate) fn drop_all_for_disabled_feature(&self) -> CatalogResult<usize> {
        let _guard = self.shared.ddl_lock().lock();
        let ids = self.collect_for_disabled_feature()?;
        if ids.is_empty() {
            return Ok(0);
        }

        let fsi_rows_present = self.store().table_exists(FOREIGN_TABLES_TABLE)?;
        let mut ops = Vec::with_capacity(ids.len() * 2);
        for &table_id in &ids {
            ops.push(TableCatalog::delete_op(table_id));
            if fsi_rows_present {
                ops.push(StoreOp::delete(FOREIGN_TABLES_TABLE, id_key(table_id)));
            }
        }
        self.store().execute(&ops)?;
        self.evict(&ids);

        info!("Removed {} foreign tables for disabled foreign storage", ids.len());
        Ok(ids.len())
    }

    fn evict(&self, table_ids: &[u32]) {
        self.tables.cache_evict_ids(table_ids);
        self.cache
            .write()
            .retain(|_, table| !table_ids.contains(&table.table_id));
    }
}
