// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Metadata store drivers
//!
//! The catalog persists its system tables through the [`MetadataStore`]
//! trait. This module provides:
//! - Table introspection (`list_tables`)
//! - Atomic DDL and row batches (`execute`)
//! - Row reads (`get`, `scan`, `last_key`)
//! - A redb file driver and an in-memory driver
//! - A process-wide registry of shared store handles keyed by path

pub mod memory;
#[cfg(feature = "redb-backend")]
pub mod redb;
pub mod shared;
pub mod types;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

pub use memory::MemoryStore;
#[cfg(feature = "redb-backend")]
pub use self::redb::RedbStore;
pub use shared::{is_open, open_shared, release_under_registry, SharedStore};
pub use types::{id_key, key_id, StorageDriverError, StorageResult, StorageType, StoreOp};

/// Relational persistence service backing the catalog
///
/// Rows are opaque byte strings addressed by `(table, key)`. Every call to
/// [`execute`](MetadataStore::execute) is all-or-nothing: no reader ever
/// observes part of a batch.
pub trait MetadataStore: Send + Sync {
    /// Names of all tables currently present in the store
    fn list_tables(&self) -> StorageResult<BTreeSet<String>>;

    /// Apply a batch of DDL and row operations atomically
    fn execute(&self, ops: &[StoreOp]) -> StorageResult<()>;

    /// Read a single row
    fn get(&self, table: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Read every row of a table in key order
    fn scan(&self, table: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Largest key of a table, if it has any rows
    fn last_key(&self, table: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Force buffered writes to durable storage
    fn flush(&self) -> StorageResult<()>;

    /// Driver type backing this store
    fn storage_type(&self) -> StorageType;

    /// Check whether a table exists
    fn table_exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.list_tables()?.contains(name))
    }
}

/// Open a store driver of the given type
///
/// The memory driver ignores `path`; durability only spans the lifetime of
/// the returned handle.
pub fn open_store(path: &Path, storage_type: StorageType) -> StorageResult<Arc<dyn MetadataStore>> {
    match storage_type {
        StorageType::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "redb-backend")]
        StorageType::Redb => Ok(Arc::new(RedbStore::open(path)?)),
        #[cfg(not(feature = "redb-backend"))]
        StorageType::Redb => Err(StorageDriverError::Unavailable {
            path: path.display().to_string(),
            reason: "redb backend not compiled in".to_string(),
        }),
    }
}
