// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Metadata store types and error handling
//!
//! This module defines the types, enums, and error handling used by the
//! metadata store drivers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata store driver type configuration
///
/// Specifies which underlying storage technology backs the catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Redb - Pure Rust ACID-compliant embedded database
    /// Best for: durable catalogs, crash-safety
    Redb,

    /// Memory - In-memory storage for testing
    /// Best for: Unit testing, ephemeral catalogs
    Memory,
}

impl Default for StorageType {
    fn default() -> Self {
        if cfg!(feature = "redb-backend") {
            StorageType::Redb
        } else {
            StorageType::Memory
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redb" => Ok(StorageType::Redb),
            "memory" => Ok(StorageType::Memory),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: redb, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Redb => "redb",
            StorageType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// A single step of an atomic store batch
///
/// Every batch handed to [`MetadataStore::execute`](super::MetadataStore::execute)
/// is applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Create an empty table (no-op if it already exists)
    CreateTable(String),
    /// Drop a table and all of its rows (no-op if absent)
    DropTable(String),
    /// Insert or replace a row
    Put {
        table: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    /// Remove a row (no-op if absent)
    Delete { table: String, key: Vec<u8> },
}

impl StoreOp {
    pub fn create_table(name: &str) -> Self {
        StoreOp::CreateTable(name.to_string())
    }

    pub fn drop_table(name: &str) -> Self {
        StoreOp::DropTable(name.to_string())
    }

    pub fn put(table: &str, key: Vec<u8>, value: Vec<u8>) -> Self {
        StoreOp::Put {
            table: table.to_string(),
            key,
            value,
        }
    }

    pub fn delete(table: &str, key: Vec<u8>) -> Self {
        StoreOp::Delete {
            table: table.to_string(),
            key,
        }
    }
}

/// Error type for metadata store operations
///
/// Covers every failure mode of the store drivers. Designed to be easily
/// converted from underlying storage engine errors.
#[derive(Debug, Error)]
pub enum StorageDriverError {
    /// I/O related errors (file system, locks, etc.)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The store could not be opened at the given location
    #[error("Unable to open metadata store at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    /// A row operation referenced a table that does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Data serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Driver-specific error (Redb, Memory, etc.)
    #[error("Storage driver error: {0}")]
    BackendSpecific(String),
}

impl From<serde_json::Error> for StorageDriverError {
    fn from(e: serde_json::Error) -> Self {
        StorageDriverError::SerializationError(e.to_string())
    }
}

/// Result type for metadata store operations
pub type StorageResult<T> = Result<T, StorageDriverError>;

/// Encode a catalog id as a store key
///
/// Big-endian so that key order matches id order.
pub fn id_key(id: u32) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

/// Decode a store key produced by [`id_key`]
pub fn key_id(key: &[u8]) -> StorageResult<u32> {
    let bytes: [u8; 4] = key.try_into().map_err(|_| {
        StorageDriverError::SerializationError(format!(
            "expected a 4 byte id key, found {} bytes",
            key.len()
        ))
    })?;
    Ok(u32::from_be_bytes(bytes))
}
