// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Foreign storage schema migration
//!
//! Brings the pair of FSI system tables in line with the feature flag given
//! at open time. The pair is created or dropped in a single store batch, so
//! a reader sees both tables or neither. A store holding exactly one of them
//! is reported as corrupt and left alone.

use super::{FOREIGN_SERVERS_TABLE, FOREIGN_TABLES_TABLE, FSI_SYSTEM_TABLES};
use crate::error::{CatalogError, CatalogResult};
use crate::foreign::ForeignTableRegistry;
use crate::store::{MetadataStore, SharedStore, StoreOp};
use log::{debug, info};

/// Observed state of the FSI system tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPresence {
    Absent,
    Present,
    Partial {
        present: &'static str,
        missing: &'static str,
    },
}

impl SchemaPresence {
    pub fn detect(store: &dyn MetadataStore) -> CatalogResult<Self> {
        let tables = store.list_tables()?;
        let servers = tables.contains(FOREIGN_SERVERS_TABLE);
        let foreign_tables = tables.contains(FOREIGN_TABLES_TABLE);

        Ok(match (servers, foreign_tables) {
            (true, true) => SchemaPresence::Present,
            (false, false) => SchemaPresence::Absent,
            (true, false) => SchemaPresence::Partial {
                present: FOREIGN_SERVERS_TABLE,
                missing: FOREIGN_TABLES_TABLE,
            },
            (false, true) => SchemaPresence::Partial {
                present: FOREIGN_TABLES_TABLE,
                missing: FOREIGN_SERVERS_TABLE,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Created,
    Dropped,
    Unchanged,
}

pub struct SchemaMigrator<'a> {
    shared: &'a SharedStore,
    foreign_tables: &'a ForeignTableRegistry,
}

impl<'a> SchemaMigrator<'a> {
    pub fn new(shared: &'a SharedStore, foreign_tables: &'a ForeignTableRegistry) -> Self {
        Self {
            shared,
            foreign_tables,
        }
    }

    pub fn presence(&self) -> CatalogResult<SchemaPresence> {
        SchemaPresence::detect(self.shared.store().as_ref())
    }

    /// Create or drop the FSI system tables to match `enabled`
    pub fn migrate(&self, enabled: bool) -> CatalogResult<MigrationOutcome> {
        let _guard = self.shared.ddl_lock().lock();
        let store = self.shared.store();

        match (enabled, self.presence()?) {
            (_, SchemaPresence::Partial { present, missing }) => {
                Err(CatalogError::SchemaCorrupt {
                    present: present.to_string(),
                    missing: missing.to_string(),
                })
            }
            (true, SchemaPresence::Absent) => {
                let ops: Vec<StoreOp> = FSI_SYSTEM_TABLES
                    .iter()
                    .map(|name| StoreOp::create_table(name))
                    .collect();
                store.execute(&ops)?;
                info!("Created foreign storage system tables");
                Ok(MigrationOutcome::Created)
            }
            (false, SchemaPresence::Present) => {
                let removed = self.foreign_tables.drop_all_for_disabled_feature()?;
                let ops: Vec<StoreOp> = FSI_SYSTEM_TABLES
                    .iter()
                    .map(|name| StoreOp::drop_table(name))
                    .collect();
                store.execute(&ops)?;
                info!(
                    "Dropped foreign storage system tables ({} foreign tables removed)",
                    removed
                );
                Ok(MigrationOutcome::Dropped)
            }
            (enabled, presence) => {
                debug!(
                    "Foreign storage schema already consistent (enabled: {}, {:?})",
                    enabled, presence
                );
                Ok(MigrationOutcome::Unchanged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDescriptor, TableCatalog, TABLES_TABLE};
    use crate::foreign::{ForeignOptions, ForeignServerRegistry};
    use crate::store::{open_shared, StorageType};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        shared: Arc<SharedStore>,
        tables: Arc<TableCatalog>,
        servers: Arc<ForeignServerRegistry>,
        foreign: ForeignTableRegistry,
    }

    fn fixture(dir: &TempDir) -> Fixture {
        let shared = open_shared(dir.path(), StorageType::Memory).unwrap();
        let tables = Arc::new(TableCatalog::new(shared.clone()));
        tables.ensure_schema().unwrap();
        let servers = Arc::new(ForeignServerRegistry::new(shared.clone(), tables.clone()));
        let foreign = ForeignTableRegistry::new(shared.clone(), tables.clone(), servers.clone());
        Fixture {
            shared,
            tables,
            servers,
            foreign,
        }
    }

    #[test]
    fn test_enable_then_disable() {
        let dir = TempDir::new().unwrap();
        let f = fixture(&dir);
        let migrator = SchemaMigrator::new(&f.shared, &f.foreign);

        assert_eq!(migrator.presence().unwrap(), SchemaPresence::Absent);
        assert_eq!(migrator.migrate(false).unwrap(), MigrationOutcome::Unchanged);
        assert_eq!(migrator.presence().unwrap(), SchemaPresence::Absent);

        assert_eq!(migrator.migrate(true).unwrap(), MigrationOutcome::Created);
        assert_eq!(migrator.migrate(true).unwrap(), MigrationOutcome::Unchanged);
        assert_eq!(migrator.presence().unwrap(), SchemaPresence::Present);

        assert_eq!(migrator.migrate(false).unwrap(), MigrationOutcome::Dropped);
        assert_eq!(migrator.migrate(false).unwrap(), MigrationOutcome::Unchanged);
        assert_eq!(migrator.presence().unwrap(), SchemaPresence::Absent);
    }

    #[test]
    fn test_partial_schema_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let f = fixture(&dir);
        f.shared
            .store()
            .execute(&[StoreOp::create_table(FOREIGN_TABLES_TABLE)])
            .unwrap();

        let migrator = SchemaMigrator::new(&f.shared, &f.foreign);
        for enabled in [true, false] {
            match migrator.migrate(enabled) {
                Err(CatalogError::SchemaCorrupt { present, missing }) => {
                    assert_eq!(present, FOREIGN_TABLES_TABLE);
                    assert_eq!(missing, FOREIGN_SERVERS_TABLE);
                }
                other => panic!("expected corrupt schema, got {:?}", other),
            }
        }
        // Nothing was repaired
        let tables = f.shared.store().list_tables().unwrap();
        assert!(tables.contains(FOREIGN_TABLES_TABLE));
        assert!(!tables.contains(FOREIGN_SERVERS_TABLE));
    }

    #[test]
    fn test_disable_removes_foreign_tables_only() {
        let dir = TempDir::new().unwrap();
        let f = fixture(&dir);
        let migrator = SchemaMigrator::new(&f.shared, &f.foreign);
        migrator.migrate(true).unwrap();
        f.servers.bootstrap_defaults(0).unwrap();

        f.tables
            .create_table("test_table", vec![ColumnDescriptor::new("c1", "INT")], 0)
            .unwrap();
        f.tables
            .create_view("test_view", "SELECT * FROM test_table;", 0)
            .unwrap();
        f.foreign
            .create(
                "test_foreign_table",
                "omnisci_local_csv",
                vec![ColumnDescriptor::new("c1", "INT")],
                ForeignOptions::new().with("file_path", "test_file.csv"),
                0,
            )
            .unwrap();

        migrator.migrate(false).unwrap();

        let remaining: Vec<String> = f
            .tables
            .scan_store()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(remaining, vec!["test_table", "test_view"]);
        assert!(f.shared.store().table_exists(TABLES_TABLE).unwrap());
    }
}
