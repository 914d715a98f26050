// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog open configuration

use crate::catalog::ROOT_USER_ID;
use crate::error::CatalogResult;
use crate::store::StorageType;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides [`CatalogConfig::enable_fsi`]
pub const ENABLE_FSI_ENV: &str = "FSI_CATALOG_ENABLE_FSI";
/// Environment variable that overrides [`CatalogConfig::storage_type`]
pub const STORAGE_TYPE_ENV: &str = "FSI_CATALOG_STORAGE";

/// Everything `Catalog::open_with_config` needs to open a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Store location: a directory, or a `.redb` file
    pub path: PathBuf,
    #[serde(default)]
    pub storage_type: StorageType,
    /// Whether foreign storage is enabled for this open
    #[serde(default)]
    pub enable_fsi: bool,
    /// Owner of the default servers created on bootstrap
    #[serde(default = "default_root_owner")]
    pub root_owner_id: i32,
}

fn default_root_owner() -> i32 {
    ROOT_USER_ID
}

impl CatalogConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            storage_type: StorageType::default(),
            enable_fsi: false,
            root_owner_id: ROOT_USER_ID,
        }
    }

    pub fn with_storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    pub fn with_fsi(mut self, enabled: bool) -> Self {
        self.enable_fsi = enabled;
        self
    }

    pub fn with_root_owner(mut self, owner_id: i32) -> Self {
        self.root_owner_id = owner_id;
        self
    }

    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `FSI_CATALOG_ENABLE_FSI` and `FSI_CATALOG_STORAGE` if set
    ///
    /// Unparseable values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(ENABLE_FSI_ENV) {
            match parse_flag(&raw) {
                Some(enabled) => self.enable_fsi = enabled,
                None => warn!("Ignoring {}={:?}: expected a boolean", ENABLE_FSI_ENV, raw),
            }
        }
        if let Ok(raw) = std::env::var(STORAGE_TYPE_ENV) {
            match raw.parse::<StorageType>() {
                Ok(storage_type) => self.storage_type = storage_type,
                Err(e) => warn!("Ignoring {}: {}", STORAGE_TYPE_ENV, e),
            }
        }
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
