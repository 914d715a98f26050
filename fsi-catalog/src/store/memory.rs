// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory metadata store driver

use super::types::{StorageDriverError, StorageResult, StorageType, StoreOp};
use super::MetadataStore;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

type Rows = BTreeMap<Vec<u8>, Vec<u8>>;

/// Memory driver implementation
///
/// Batches are applied to a copy of the touched tables and swapped in under
/// the write lock, so a failing batch leaves the store unchanged.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Rows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryStore {
    fn list_tables(&self) -> StorageResult<BTreeSet<String>> {
        Ok(self.tables.read().keys().cloned().collect())
    }

    fn execute(&self, ops: &[StoreOp]) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let mut staged = tables.clone();

        for op in ops {
            match op {
                StoreOp::CreateTable(name) => {
                    staged.entry(name.clone()).or_default();
                }
                StoreOp::DropTable(name) => {
                    staged.remove(name);
                }
                StoreOp::Put { table, key, value } => {
                    staged
                        .get_mut(table)
                        .ok_or_else(|| StorageDriverError::TableNotFound(table.clone()))?
                        .insert(key.clone(), value.clone());
                }
                StoreOp::Delete { table, key } => {
                    staged
                        .get_mut(table)
                        .ok_or_else(|| StorageDriverError::TableNotFound(table.clone()))?
                        .remove(key);
                }
            }
        }

        *tables = staged;
        Ok(())
    }

    fn get(&self, table: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let tables = self.tables.read();
        let rows = tables
            .get(table)
            .ok_or_else(|| StorageDriverError::TableNotFound(table.to_string()))?;
        Ok(rows.get(key).cloned())
    }

    fn scan(&self, table: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let tables = self.tables.read();
        let rows = tables
            .get(table)
            .ok_or_else(|| StorageDriverError::TableNotFound(table.to_string()))?;
        Ok(rows.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn last_key(&self, table: &str) -> StorageResult<Option<Vec<u8>>> {
        let tables = self.tables.read();
        let rows = tables
            .get(table)
            .ok_or_else(|| StorageDriverError::TableNotFound(table.to_string()))?;
        Ok(rows.keys().next_back().cloned())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_batch_leaves_store_untouched() {
        let store = MemoryStore::new();
        store.execute(&[StoreOp::create_table("a")]).unwrap();

        let result = store.execute(&[
            StoreOp::create_table("b"),
            StoreOp::put("a", b"k".to_vec(), b"v".to_vec()),
            StoreOp::put("missing", b"k".to_vec(), b"v".to_vec()),
        ]);
        assert!(matches!(result, Err(StorageDriverError::TableNotFound(t)) if t == "missing"));

        let tables = store.list_tables().unwrap();
        assert!(tables.contains("a"));
        assert!(!tables.contains("b"));
        assert_eq!(store.get("a", b"k").unwrap(), None);
    }

    #[test]
    fn test_drop_table_removes_rows() {
        let store = MemoryStore::new();
        store
            .execute(&[
                StoreOp::create_table("t"),
                StoreOp::put("t", b"1".to_vec(), b"one".to_vec()),
            ])
            .unwrap();
        store.execute(&[StoreOp::drop_table("t")]).unwrap();
        assert!(!store.table_exists("t").unwrap());

        store.execute(&[StoreOp::create_table("t")]).unwrap();
        assert!(store.scan("t").unwrap().is_empty());
    }

    #[test]
    fn test_last_key_follows_key_order() {
        let store = MemoryStore::new();
        store
            .execute(&[
                StoreOp::create_table("t"),
                StoreOp::put("t", vec![0, 0, 0, 9], vec![]),
                StoreOp::put("t", vec![0, 0, 1, 0], vec![]),
                StoreOp::put("t", vec![0, 0, 0, 2], vec![]),
            ])
            .unwrap();
        assert_eq!(store.last_key("t").unwrap(), Some(vec![0, 0, 1, 0]));
    }
}
