// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Foreign server registry
//!
//! Owns the rows of `omnisci_foreign_servers` and an in-memory cache of
//! them. Writes go straight to the store under the store's DDL lock and then
//! refresh the cache; `get_skip_cache` re-reads the store for callers that
//! need to observe durable state or writes from another catalog instance.

use super::options::ForeignOptions;
use super::wrapper::{
    DataWrapperKind, BASE_PATH_KEY, LOCAL_FILE_STORAGE_TYPE, STORAGE_TYPE_KEY,
};
use crate::catalog::{TableCatalog, FOREIGN_SERVERS_TABLE, FOREIGN_TABLES_TABLE};
use crate::error::{CatalogError, CatalogResult};
use crate::store::{id_key, key_id, MetadataStore, SharedStore, StoreOp};
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Default servers created when foreign storage is enabled
pub const DEFAULT_SERVERS: [(&str, DataWrapperKind); 2] = [
    ("omnisci_local_csv", DataWrapperKind::Csv),
    ("omnisci_local_parquet", DataWrapperKind::Parquet),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignServer {
    pub id: u32,
    pub name: String,
    pub data_wrapper: DataWrapperKind,
    pub owner_id: i32,
    pub options: ForeignOptions,
}

/// Row of `omnisci_foreign_servers`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ForeignServerRow {
    pub id: u32,
    pub name: String,
    pub data_wrapper: String,
    pub owner_id: i32,
    pub options: String,
}

impl ForeignServer {
    fn to_row(&self) -> CatalogResult<ForeignServerRow> {
        Ok(ForeignServerRow {
            id: self.id,
            name: self.name.clone(),
            data_wrapper: self.data_wrapper.name().to_string(),
            owner_id: self.owner_id,
            options: self.options.to_json_string()?,
        })
    }

    fn from_row(row: ForeignServerRow) -> CatalogResult<Self> {
        Ok(ForeignServer {
            id: row.id,
            name: row.name,
            data_wrapper: row.data_wrapper.parse()?,
            owner_id: row.owner_id,
            options: ForeignOptions::from_json_str(&row.options)?,
        })
    }
}

/// Row of `omnisci_foreign_tables`, shared with the foreign table registry
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ForeignTableRow {
    pub table_id: u32,
    pub server_id: u32,
    pub options: String,
}

pub(crate) fn scan_foreign_table_rows(
    store: &dyn MetadataStore,
) -> CatalogResult<Vec<ForeignTableRow>> {
    store
        .scan(FOREIGN_TABLES_TABLE)?
        .into_iter()
        .map(|(_, value)| Ok(serde_json::from_slice(&value)?))
        .collect()
}

pub struct ForeignServerRegistry {
    shared: Arc<SharedStore>,
    tables: Arc<TableCatalog>,
    cache: RwLock<HashMap<String, Arc<ForeignServer>>>,
}

impl ForeignServerRegistry {
    pub(crate) fn new(shared: Arc<SharedStore>, tables: Arc<TableCatalog>) -> Self {
        Self {
            shared,
            tables,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn store(&self) -> &dyn MetadataStore {
        self.shared.store().as_ref()
    }

    fn scan_store(&self) -> CatalogResult<Vec<ForeignServer>> {
        self.store()
            .scan(FOREIGN_SERVERS_TABLE)?
            .into_iter()
            .map(|(_, value)| ForeignServer::from_row(serde_json::from_slice(&value)?))
            .collect()
    }

    fn find_in_store(&self, name: &str) -> CatalogResult<Option<ForeignServer>> {
        Ok(self.scan_store()?.into_iter().find(|s| s.name == name))
    }

    /// Replace the cache with the rows currently in the store
    pub(crate) fn load(&self) -> CatalogResult<usize> {
        let servers = self.scan_store()?;
        let mut cache = self.cache.write();
        cache.clear();
        for server in servers {
            cache.insert(server.name.clone(), Arc::new(server));
        }
        debug!("Loaded {} foreign servers", cache.len());
        Ok(cache.len())
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Create a foreign server
    ///
    /// `wrapper` is a data wrapper name such as `OMNISCI_CSV`.
    pub fn create(
        &self,
        name: &str,
        wrapper: &str,
        owner_id: i32,
        options: ForeignOptions,
    ) -> CatalogResult<Arc<ForeignServer>> {
        let data_wrapper: DataWrapperKind = wrapper.parse()?;
        data_wrapper.descriptor().validate_server_options(&options)?;

        let _guard = self.shared.ddl_lock().lock();
        if self.find_in_store(name)?.is_some() {
            return Err(CatalogError::duplicate("Foreign server", name));
        }

        let id = match self.store().last_key(FOREIGN_SERVERS_TABLE)? {
            Some(key) => key_id(&key)? + 1,
            None => 1,
        };
        let server = ForeignServer {
            id,
            name: name.to_string(),
            data_wrapper,
            owner_id,
            options,
        };
        self.store().execute(&[StoreOp::put(
            FOREIGN_SERVERS_TABLE,
            id_key(id),
            serde_json::to_vec(&server.to_row()?)?,
        )])?;

        let server = Arc::new(server);
        self.cache.write().insert(name.to_string(), server.clone());
        info!(
            "Created foreign server '{}' (id {}, wrapper {})",
            name, id, data_wrapper
        );
        Ok(server)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ForeignServer>> {
        self.cache.read().get(name).cloned()
    }

    pub fn get_by_id(&self, id: u32) -> Option<Arc<ForeignServer>> {
        self.cache.read().values().find(|s| s.id == id).cloned()
    }

    /// Read a server from the store, bypassing and then refreshing the cache
    pub fn get_skip_cache(&self, name: &str) -> CatalogResult<Option<Arc<ForeignServer>>> {
        let server = self.find_in_store(name)?.map(Arc::new);
        let mut cache = self.cache.write();
        match &server {
            Some(server) => {
                cache.insert(name.to_string(), server.clone());
            }
            None => {
                cache.remove(name);
            }
        }
        Ok(server)
    }

    /// All cached servers ordered by id
    pub fn list(&self) -> Vec<Arc<ForeignServer>> {
        let mut servers: Vec<_> = self.cache.read().values().cloned().collect();
        servers.sort_by_key(|s| s.id);
        servers
    }

    /// Drop a foreign server that no foreign table references
    pub fn drop(&self, name: &str) -> CatalogResult<()> {
        let _guard = self.shared.ddl_lock().lock();
        let server = self
            .find_in_store(name)?
            .ok_or_else(|| CatalogError::not_found("Foreign server", name))?;

        let referencing: Vec<String> = scan_foreign_table_rows(self.store())?
            .into_iter()
            .filter(|row| row.server_id == server.id)
            .map(|row| {
                self.tables
                    .get_metadata_for_table_id(row.table_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| format!("#{}", row.table_id))
            })
            .collect();
        if !referencing.is_empty() {
            return Err(CatalogError::ReferentialViolation {
                server: name.to_string(),
                tables: referencing,
            });
        }

        self.store()
            .execute(&[StoreOp::delete(FOREIGN_SERVERS_TABLE, id_key(server.id))])?;
        self.cache.write().remove(name);
        info!("Dropped foreign server '{}'", name);
        Ok(())
    }

    /// Create any missing default server, owned by `owner_id`
    ///
    /// Returns the number of servers created; zero on every run after the first.
    pub fn bootstrap_defaults(&self, owner_id: i32) -> CatalogResult<usize> {
        let _guard = self.shared.ddl_lock().lock();
        let mut created = 0;

        for (name, wrapper) in DEFAULT_SERVERS {
            if let Some(existing) = self.get_skip_cache(name)? {
                debug!("Default server '{}' already present (id {})", name, existing.id);
                continue;
            }

            let options = ForeignOptions::new()
                .with(STORAGE_TYPE_KEY, LOCAL_FILE_STORAGE_TYPE)
                .with(BASE_PATH_KEY, "/");
            self.create(name, wrapper.name(), owner_id, options)?;
            created += 1;
        }

        if created > 0 {
            info!("Bootstrapped {} default foreign servers", created);
        }
        Ok(created)
    }
}
