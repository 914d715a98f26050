// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Global registry of shared store handles
//!
//! Catalog instances opened against the same physical store path share one
//! driver and one DDL lock. Entries are held weakly so the underlying file
//! is released once the last catalog using it closes.

use super::types::{StorageResult, StorageType};
use super::{open_store, MetadataStore};
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

static STORE_REGISTRY: Lazy<Mutex<HashMap<(StorageType, PathBuf), Weak<SharedStore>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A store driver shared by every catalog opened on the same path
pub struct SharedStore {
    path: PathBuf,
    store: Arc<dyn MetadataStore>,
    /// Serializes schema migration, default bootstrap and registry writes.
    /// Re-entrant because the migrator drives the foreign table cascade
    /// while holding it.
    ddl_lock: ReentrantMutex<()>,
}

impl SharedStore {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn ddl_lock(&self) -> &ReentrantMutex<()> {
        &self.ddl_lock
    }
}

impl std::fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore")
            .field("path", &self.path)
            .field("storage_type", &self.store.storage_type())
            .finish()
    }
}

/// Physical location a driver of `storage_type` opens for `path`
fn physical_path(path: &Path, storage_type: StorageType) -> PathBuf {
    match storage_type {
        #[cfg(feature = "redb-backend")]
        StorageType::Redb => super::redb::database_path(path),
        #[cfg(not(feature = "redb-backend"))]
        StorageType::Redb => path.to_path_buf(),
        StorageType::Memory => path.to_path_buf(),
    }
}

/// Canonicalize the deepest existing ancestor of `path` and append the rest
///
/// The result does not change once the missing components are created.
fn resolve_path(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        let existing = if current.as_os_str().is_empty() {
            Path::new(".")
        } else {
            current
        };
        if let Ok(canonical) = std::fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn registry_key(path: &Path, storage_type: StorageType) -> (StorageType, PathBuf) {
    (storage_type, resolve_path(&physical_path(path, storage_type)))
}

/// Open (or join) the shared store for `path`
///
/// The registry mutex is held while the driver opens, so two concurrent
/// callers on one path never open the file twice.
pub fn open_shared(path: &Path, storage_type: StorageType) -> StorageResult<Arc<SharedStore>> {
    let key = registry_key(path, storage_type);
    let mut registry = STORE_REGISTRY.lock();

    if let Some(existing) = registry.get(&key).and_then(Weak::upgrade) {
        debug!("Joining open metadata store at {}", key.1.display());
        return Ok(existing);
    }

    let store = open_store(path, storage_type)?;
    let shared = Arc::new(SharedStore {
        path: path.to_path_buf(),
        store,
        ddl_lock: ReentrantMutex::new(()),
    });

    registry.retain(|_, weak| weak.strong_count() > 0);
    registry.insert(key, Arc::downgrade(&shared));
    Ok(shared)
}

/// Drop `handles` while holding the registry lock
///
/// When `handles` owns the last reference to a store, the driver is closed
/// before any concurrent [`open_shared`] of the same path can run.
pub fn release_under_registry<T>(handles: T) {
    let _registry = STORE_REGISTRY.lock();
    drop(handles);
}

/// Whether a catalog currently holds the shared store for `path`
pub fn is_open(path: &Path, storage_type: StorageType) -> bool {
    let key = registry_key(path, storage_type);
    STORE_REGISTRY
        .lock()
        .get(&key)
        .is_some_and(|weak| weak.strong_count() > 0)
}
