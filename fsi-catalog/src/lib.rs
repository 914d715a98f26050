// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! FSI catalog - foreign storage metadata for an analytical database catalog
//!
//! This crate keeps the metadata of the optional foreign storage feature
//! consistent in a persistent store across restarts and feature flag
//! changes, without touching ordinary tables and views.
//!
//! # Quick Start
//!
//! ```no_run
//! use fsi_catalog::{Catalog, CatalogError, ColumnDescriptor, ForeignOptions, ROOT_USER_ID};
//!
//! # fn main() -> Result<(), CatalogError> {
//! let mut catalog = Catalog::new();
//! catalog.open("./catalog", ROOT_USER_ID, true)?;
//!
//! let table = catalog.foreign_tables()?.create(
//!     "events",
//!     "omnisci_local_csv",
//!     vec![ColumnDescriptor::new("id", "INT")],
//!     ForeignOptions::new().with("file_path", "events.csv"),
//!     ROOT_USER_ID,
//! )?;
//! println!("created table {}", table.table_id);
//!
//! // Disabling the feature removes every foreign table on the next open
//! catalog.reset();
//! catalog.open("./catalog", ROOT_USER_ID, false)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Catalog (open/close state machine)     │
//! └─────────────────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐  ┌──────────────────────────────┐
//! │  SchemaMigrator  │  │  TableCatalog                │
//! │                  │  │  ForeignServerRegistry       │
//! │                  │  │  ForeignTableRegistry        │
//! └──────────────────┘  └──────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────────────────────────────┐
//! │  SharedStore (per-path handle + lock)   │
//! │  MetadataStore: redb | memory           │
//! └─────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod foreign;
pub mod store;

pub use catalog::{
    Catalog, CatalogState, ColumnDescriptor, MigrationOutcome, SchemaMigrator, SchemaPresence,
    TableCatalog, TableDescriptor, TableKind, FOREIGN_SERVERS_TABLE, FOREIGN_TABLES_TABLE,
    ROOT_USER_ID, TABLES_TABLE,
};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use foreign::{
    DataWrapperKind, ForeignOptions, ForeignServer, ForeignServerRegistry, ForeignTable,
    ForeignTableRegistry, WrapperDescriptor, DEFAULT_SERVERS,
};
pub use store::{MetadataStore, StorageDriverError, StorageType};
