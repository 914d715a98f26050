// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared fixtures for catalog integration tests

#![allow(dead_code)]

use fsi_catalog::{
    Catalog, CatalogConfig, ColumnDescriptor, MetadataStore, StorageType, ROOT_USER_ID,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A redb-backed catalog directory that lives for the duration of a test
pub struct CatalogFixture {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl CatalogFixture {
    pub fn new() -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("catalog");
        Self {
            _temp_dir: temp_dir,
            path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn config(&self, enable_fsi: bool) -> CatalogConfig {
        CatalogConfig::new(&self.path)
            .with_storage_type(StorageType::Redb)
            .with_fsi(enable_fsi)
    }

    /// Open a fresh catalog instance, panicking on failure
    pub fn open(&self, enable_fsi: bool) -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .open_with_config(&self.config(enable_fsi))
            .unwrap_or_else(|e| panic!("open(enable_fsi = {}) failed: {}", enable_fsi, e));
        catalog
    }

    /// Names of the system tables physically present in the store
    pub fn store_tables(&self, catalog: &Catalog) -> BTreeSet<String> {
        catalog
            .metadata_store()
            .expect("catalog not ready")
            .list_tables()
            .expect("list_tables failed")
    }
}

pub fn int_column() -> Vec<ColumnDescriptor> {
    vec![ColumnDescriptor::new("c1", "INT")]
}

pub const OWNER: i32 = ROOT_USER_ID;
