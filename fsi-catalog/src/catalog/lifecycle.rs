// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog open/close state machine
//!
//! `open()` connects to the store, brings the foreign storage schema in line
//! with the feature flag, loads the registries and bootstraps the default
//! servers. The per-path DDL lock is held from migration through bootstrap,
//! so concurrent opens of one store create the schema and the defaults once.
//!
//! A feature flag change takes effect only through `reset()` followed by
//! another `open()`.

use super::migration::{SchemaMigrator, SchemaPresence};
use super::tables::{TableCatalog, TableDescriptor};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::foreign::{ForeignServerRegistry, ForeignTableRegistry};
use crate::store::{open_shared, release_under_registry, MetadataStore, SharedStore};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Closed,
    Migrating,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for CatalogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogState::Closed => "closed",
            CatalogState::Migrating => "migrating",
            CatalogState::Loading => "loading",
            CatalogState::Ready => "ready",
            CatalogState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Registries bound to one open store
struct OpenCatalog {
    shared: Arc<SharedStore>,
    tables: Arc<TableCatalog>,
    servers: Arc<ForeignServerRegistry>,
    foreign_tables: Arc<ForeignTableRegistry>,
    fsi_enabled: bool,
}

impl OpenCatalog {
    fn connect(config: &CatalogConfig) -> CatalogResult<Self> {
        let shared = open_shared(&config.path, config.storage_type)
            .map_err(|e| CatalogError::StoreUnavailable(e.to_string()))?;
        let tables = Arc::new(TableCatalog::new(shared.clone()));
        let servers = Arc::new(ForeignServerRegistry::new(shared.clone(), tables.clone()));
        let foreign_tables = Arc::new(ForeignTableRegistry::new(
            shared.clone(),
            tables.clone(),
            servers.clone(),
        ));
        Ok(Self {
            shared,
            tables,
            servers,
            foreign_tables,
            fsi_enabled: config.enable_fsi,
        })
    }

    fn release(self) {
        self.foreign_tables.clear_cache();
        self.servers.clear_cache();
        self.tables.clear_cache();
        if let Err(e) = self.shared.store().flush() {
            warn!(
                "Failed to flush metadata store at {}: {}",
                self.shared.path().display(),
                e
            );
        }
        release_under_registry(self);
    }
}

/// A catalog instance over one metadata store
pub struct Catalog {
    state: CatalogState,
    open: Option<OpenCatalog>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            state: CatalogState::Closed,
            open: None,
        }
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    /// Open the store at `store_path` with the default storage type
    pub fn open(
        &mut self,
        store_path: impl AsRef<Path>,
        owner_id_for_defaults: i32,
        enabled: bool,
    ) -> CatalogResult<()> {
        let config = CatalogConfig::new(store_path)
            .with_fsi(enabled)
            .with_root_owner(owner_id_for_defaults);
        self.open_with_config(&config)
    }

    pub fn open_with_config(&mut self, config: &CatalogConfig) -> CatalogResult<()> {
        if self.state != CatalogState::Closed {
            return Err(CatalogError::AlreadyOpen(self.state));
        }
        info!(
            "Opening catalog at {} ({}, foreign storage {})",
            config.path.display(),
            config.storage_type,
            if config.enable_fsi { "enabled" } else { "disabled" }
        );

        // Connecting to the store is part of Migrating
        self.state = CatalogState::Migrating;
        match self.try_open(config) {
            Ok(open) => {
                self.open = Some(open);
                self.state = CatalogState::Ready;
                info!("Catalog at {} is ready", config.path.display());
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to open catalog at {} while {}: {}",
                    config.path.display(),
                    self.state,
                    e
                );
                self.state = CatalogState::Failed;
                Err(e)
            }
        }
    }

    fn try_open(&mut self, config: &CatalogConfig) -> CatalogResult<OpenCatalog> {
        let open = OpenCatalog::connect(config)?;
        match self.initialize(&open, config) {
            Ok(()) => Ok(open),
            Err(e) => {
                release_under_registry(open);
                Err(e)
            }
        }
    }

    fn initialize(&mut self, open: &OpenCatalog, config: &CatalogConfig) -> CatalogResult<()> {
        let _guard = open.shared.ddl_lock().lock();

        self.state = CatalogState::Migrating;
        open.tables.ensure_schema()?;
        let outcome =
            SchemaMigrator::new(&open.shared, &open.foreign_tables).migrate(config.enable_fsi)?;
        debug!("Migration outcome: {:?}", outcome);

        self.state = CatalogState::Loading;
        open.tables.load()?;
        if config.enable_fsi {
            open.servers.load()?;
            open.foreign_tables.load()?;
            open.servers.bootstrap_defaults(config.root_owner_id)?;
        }
        Ok(())
    }

    /// Flush the store, drop caches and release the store handle
    ///
    /// No-op when already closed; a failed catalog is reset.
    pub fn close(&mut self) {
        match self.state {
            CatalogState::Closed => {}
            CatalogState::Ready => {
                if let Some(open) = self.open.take() {
                    let path = open.shared.path().to_path_buf();
                    open.release();
                    info!("Closed catalog at {}", path.display());
                }
                self.state = CatalogState::Closed;
            }
            _ => self.reset(),
        }
    }

    /// Return to `Closed` from any state
    pub fn reset(&mut self) {
        if let Some(open) = self.open.take() {
            open.release();
        }
        if self.state != CatalogState::Closed {
            debug!("Catalog reset from state {}", self.state);
        }
        self.state = CatalogState::Closed;
    }

    fn ready(&self) -> CatalogResult<&OpenCatalog> {
        match (&self.open, self.state) {
            (Some(open), CatalogState::Ready) => Ok(open),
            _ => Err(CatalogError::NotReady(self.state)),
        }
    }

    fn ready_fsi(&self) -> CatalogResult<&OpenCatalog> {
        let open = self.ready()?;
        if open.fsi_enabled {
            Ok(open)
        } else {
            Err(CatalogError::FsiDisabled)
        }
    }

    /// Whether the catalog is open with foreign storage enabled
    pub fn is_fsi_enabled(&self) -> bool {
        self.ready().map(|open| open.fsi_enabled).unwrap_or(false)
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.open.as_ref().map(|open| open.shared.path())
    }

    pub fn schema_presence(&self) -> CatalogResult<SchemaPresence> {
        SchemaPresence::detect(self.metadata_store()?)
    }

    /// The underlying store, for introspection
    pub fn metadata_store(&self) -> CatalogResult<&dyn MetadataStore> {
        Ok(self.ready()?.shared.store().as_ref())
    }

    pub fn tables(&self) -> CatalogResult<&TableCatalog> {
        Ok(self.ready()?.tables.as_ref())
    }

    pub fn foreign_servers(&self) -> CatalogResult<&ForeignServerRegistry> {
        Ok(self.ready_fsi()?.servers.as_ref())
    }

    pub fn foreign_tables(&self) -> CatalogResult<&ForeignTableRegistry> {
        Ok(self.ready_fsi()?.foreign_tables.as_ref())
    }

    pub fn get_metadata_for_table(&self, name: &str) -> CatalogResult<Option<Arc<TableDescriptor>>> {
        Ok(self.tables()?.get_metadata_for_table(name))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FOREIGN_SERVERS_TABLE, ROOT_USER_ID};
    use crate::store::{StorageType, StoreOp};
    use tempfile::TempDir;

    fn memory_config(dir: &TempDir, enabled: bool) -> CatalogConfig {
        CatalogConfig::new(dir.path())
            .with_storage_type(StorageType::Memory)
            .with_fsi(enabled)
    }

    #[test]
    fn test_open_close_transitions() {
        let dir = TempDir::new().unwrap();
        let mut catalog = Catalog::new();
        assert_eq!(catalog.state(), CatalogState::Closed);
        assert!(matches!(
            catalog.tables(),
            Err(CatalogError::NotReady(CatalogState::Closed))
        ));

        catalog.open_with_config(&memory_config(&dir, true)).unwrap();
        assert_eq!(catalog.state(), CatalogState::Ready);
        assert!(catalog.is_fsi_enabled());
        assert_eq!(catalog.schema_presence().unwrap(), SchemaPresence::Present);
        assert_eq!(catalog.foreign_servers().unwrap().list().len(), 2);

        assert!(matches!(
            catalog.open_with_config(&memory_config(&dir, true)),
            Err(CatalogError::AlreadyOpen(CatalogState::Ready))
        ));

        catalog.close();
        assert_eq!(catalog.state(), CatalogState::Closed);
        assert!(catalog.store_path().is_none());
        catalog.close();
        assert_eq!(catalog.state(), CatalogState::Closed);
    }

    #[test]
    fn test_disabled_hides_foreign_registries() {
        let dir = TempDir::new().unwrap();
        let mut catalog = Catalog::new();
        catalog.open_with_config(&memory_config(&dir, false)).unwrap();

        assert!(!catalog.is_fsi_enabled());
        assert!(catalog.tables().is_ok());
        assert!(matches!(catalog.foreign_servers(), Err(CatalogError::FsiDisabled)));
        assert!(matches!(catalog.foreign_tables(), Err(CatalogError::FsiDisabled)));
        assert_eq!(catalog.schema_presence().unwrap(), SchemaPresence::Absent);
    }

    #[test]
    fn test_corrupt_schema_fails_open() {
        let dir = TempDir::new().unwrap();
        let mut holder = Catalog::new();
        holder.open_with_config(&memory_config(&dir, false)).unwrap();
        let shared = holder.ready().unwrap().shared.clone();
        shared
            .store()
            .execute(&[StoreOp::create_table(FOREIGN_SERVERS_TABLE)])
            .unwrap();

        let mut catalog = Catalog::new();
        let err = catalog
            .open_with_config(&memory_config(&dir, true))
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, CatalogError::SchemaCorrupt { .. }));
        assert_eq!(catalog.state(), CatalogState::Failed);
        assert!(matches!(
            catalog.tables(),
            Err(CatalogError::NotReady(CatalogState::Failed))
        ));

        catalog.reset();
        assert_eq!(catalog.state(), CatalogState::Closed);
    }

    #[cfg(feature = "redb-backend")]
    #[test]
    fn test_unopenable_store_fails_from_migrating() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let config =
            CatalogConfig::new(blocker.join("catalog")).with_storage_type(StorageType::Redb);

        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.open_with_config(&config),
            Err(CatalogError::StoreUnavailable(_))
        ));
        assert_eq!(catalog.state(), CatalogState::Failed);
        assert!(catalog.store_path().is_none());
        assert!(matches!(
            catalog.open_with_config(&config),
            Err(CatalogError::AlreadyOpen(CatalogState::Failed))
        ));

        catalog.close();
        assert_eq!(catalog.state(), CatalogState::Closed);
    }

    #[test]
    fn test_reset_and_reopen_applies_new_flag() {
        let dir = TempDir::new().unwrap();
        let mut catalog = Catalog::new();
        catalog.open_with_config(&memory_config(&dir, true)).unwrap();
        assert_eq!(
            catalog.foreign_servers().unwrap().get("omnisci_local_csv").unwrap().owner_id,
            ROOT_USER_ID
        );

        // The memory store lives only while a handle is open
        let keep_alive = catalog.ready().unwrap().shared.clone();
        catalog.reset();
        catalog.open_with_config(&memory_config(&dir, false)).unwrap();
        assert_eq!(catalog.schema_presence().unwrap(), SchemaPresence::Absent);
        drop(keep_alive);
    }
}
