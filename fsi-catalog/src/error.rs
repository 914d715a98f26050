// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for catalog operations

use crate::catalog::CatalogState;
use crate::store::StorageDriverError;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Main error type for catalog operations
///
/// `StoreUnavailable` and `SchemaCorrupt` abort `open()`; every other kind
/// is returned to the caller of a single DDL operation and leaves the
/// catalog usable.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The metadata store could not be reached or opened
    #[error("Metadata store unavailable: {0}")]
    StoreUnavailable(String),

    /// Exactly one of the paired FSI system tables exists
    #[error(
        "Catalog schema is corrupt: table '{present}' exists but '{missing}' does not; \
         repair the metadata store before opening the catalog"
    )]
    SchemaCorrupt { present: String, missing: String },

    /// An object with this name already exists in its namespace
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// The data wrapper name does not match any known wrapper
    #[error("Unknown data wrapper '{0}'")]
    UnknownWrapper(String),

    /// A foreign table referenced a server that does not exist
    #[error("Foreign server '{0}' does not exist")]
    UnknownServer(String),

    /// The data wrapper requires an option that was not supplied
    #[error("Data wrapper {wrapper} requires option '{option}'")]
    MissingRequiredOption { wrapper: String, option: String },

    /// The data wrapper does not accept this option
    #[error("Data wrapper {wrapper} does not support option '{option}'")]
    UnsupportedOption { wrapper: String, option: String },

    /// The object is still referenced by other catalog objects
    #[error(
        "Foreign server '{}' is referenced by foreign tables: {}",
        .server,
        .tables.join(", ")
    )]
    ReferentialViolation { server: String, tables: Vec<String> },

    /// The object to drop does not exist
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: &'static str, name: String },

    /// The catalog is not open
    #[error("Catalog is not ready (state: {0})")]
    NotReady(CatalogState),

    /// `open()` called on an instance that is not closed
    #[error("Catalog is already open (state: {0})")]
    AlreadyOpen(CatalogState),

    /// Foreign storage registries were requested with the feature off
    #[error("Foreign storage is not enabled for this catalog")]
    FsiDisabled,

    /// Error from the metadata store driver
    #[error("Storage error: {0}")]
    Storage(#[from] StorageDriverError),

    /// Row or options (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        CatalogError::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        CatalogError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether the error leaves the catalog unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CatalogError::StoreUnavailable(_) | CatalogError::SchemaCorrupt { .. }
        )
    }
}
