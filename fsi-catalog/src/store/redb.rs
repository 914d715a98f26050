// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! REDB metadata store driver
//!
//! Each catalog system table is a separate redb table. A batch runs inside a
//! single write transaction, so table creation, table drops and row writes
//! commit together or not at all.

use super::types::{StorageDriverError, StorageResult, StorageType, StoreOp};
use super::MetadataStore;
use ::redb::{
    Database, ReadTransaction, ReadableTable, TableDefinition, TableError, TableHandle,
};
use log::debug;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name used when the store path is a directory
pub const CATALOG_FILE_NAME: &str = "catalog.redb";

fn backend<E: std::fmt::Display>(e: E) -> StorageDriverError {
    StorageDriverError::BackendSpecific(e.to_string())
}

fn table_def(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Database file the driver opens for `path`
pub fn database_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "redb") {
        path.to_path_buf()
    } else {
        path.join(CATALOG_FILE_NAME)
    }
}

/// REDB driver implementation
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the catalog database
    ///
    /// REDB requires a file path. A path ending in `.redb` names the file
    /// directly; any other path is a catalog directory (created if missing)
    /// holding [`CATALOG_FILE_NAME`].
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db_path = database_path(path.as_ref());

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&db_path).map_err(|e| StorageDriverError::Unavailable {
            path: db_path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!("Opened redb metadata store at {}", db_path.display());
        Ok(RedbStore { db })
    }

    fn read_txn(&self) -> StorageResult<ReadTransaction> {
        self.db.begin_read().map_err(backend)
    }
}

fn missing_table(table: &str, e: TableError) -> StorageDriverError {
    match e {
        TableError::TableDoesNotExist(_) => StorageDriverError::TableNotFound(table.to_string()),
        other => backend(other),
    }
}

impl MetadataStore for RedbStore {
    fn list_tables(&self) -> StorageResult<BTreeSet<String>> {
        let read_txn = self.read_txn()?;
        let names = read_txn
            .list_tables()
            .map_err(backend)?
            .map(|handle| handle.name().to_string())
            .collect();
        Ok(names)
    }

    fn execute(&self, ops: &[StoreOp]) -> StorageResult<()> {
        let write_txn = self.db.begin_write().map_err(backend)?;

        // A write transaction creates tables on open, so row operations are
        // checked against the tables known to exist at this point of the batch.
        let mut existing: BTreeSet<String> = write_txn
            .list_tables()
            .map_err(backend)?
            .map(|handle| handle.name().to_string())
            .collect();

        for op in ops {
            match op {
                StoreOp::CreateTable(name) => {
                    write_txn.open_table(table_def(name)).map_err(backend)?;
                    existing.insert(name.clone());
                }
                StoreOp::DropTable(name) => {
                    write_txn.delete_table(table_def(name)).map_err(backend)?;
                    existing.remove(name);
                }
                StoreOp::Put { table, key, value } => {
                    if !existing.contains(table) {
                        return Err(StorageDriverError::TableNotFound(table.clone()));
                    }
                    let mut t = write_txn.open_table(table_def(table)).map_err(backend)?;
                    t.insert(key.as_slice(), value.as_slice()).map_err(backend)?;
                }
                StoreOp::Delete { table, key } => {
                    if !existing.contains(table) {
                        return Err(StorageDriverError::TableNotFound(table.clone()));
                    }
                    let mut t = write_txn.open_table(table_def(table)).map_err(backend)?;
                    t.remove(key.as_slice()).map_err(backend)?;
                }
            }
        }

        // Dropping the transaction without commit aborts it on every early return above.
        write_txn.commit().map_err(backend)?;
        Ok(())
    }

    fn get(&self, table: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.read_txn()?;
        let t = read_txn
            .open_table(table_def(table))
            .map_err(|e| missing_table(table, e))?;
        let result = t.get(key).map_err(backend)?;
        Ok(result.map(|guard| guard.value().to_vec()))
    }

    fn scan(&self, table: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        // REDB's iterators are tied to transactions, so rows are collected eagerly
        let read_txn = self.read_txn()?;
        let t = read_txn
            .open_table(table_def(table))
            .map_err(|e| missing_table(table, e))?;

        let rows = t
            .iter()
            .map_err(backend)?
            .map(|result| {
                result
                    .map(|(k, v)| (k.value().to_vec(), v.value().to_vec()))
                    .map_err(backend)
            })
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(rows)
    }

    fn last_key(&self, table: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.read_txn()?;
        let t = read_txn
            .open_table(table_def(table))
            .map_err(|e| missing_table(table, e))?;
        let last = t.last().map_err(backend)?;
        Ok(last.map(|(k, _)| k.value().to_vec()))
    }

    fn flush(&self) -> StorageResult<()> {
        // REDB commits are durable; there is nothing buffered to flush
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Redb
    }
}
