// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog lifecycle and schema migration
//!
//! This module implements the open/close state machine of a catalog
//! instance, the migration that creates or drops the foreign storage system
//! tables, and the generic table catalog shared with ordinary tables and
//! views.

pub mod lifecycle;
pub mod migration;
pub mod tables;

pub use lifecycle::{Catalog, CatalogState};
pub use migration::{MigrationOutcome, SchemaMigrator, SchemaPresence};
pub use tables::{ColumnDescriptor, TableCatalog, TableDescriptor, TableKind};

/// Generic table/view catalog, always present
pub const TABLES_TABLE: &str = "omnisci_tables";
/// Foreign servers, present only while foreign storage is enabled
pub const FOREIGN_SERVERS_TABLE: &str = "omnisci_foreign_servers";
/// FSI-specific foreign table rows, paired with [`FOREIGN_SERVERS_TABLE`]
pub const FOREIGN_TABLES_TABLE: &str = "omnisci_foreign_tables";

/// The system tables created and dropped together by the migrator
pub const FSI_SYSTEM_TABLES: [&str; 2] = [FOREIGN_SERVERS_TABLE, FOREIGN_TABLES_TABLE];

/// Principal that owns the built-in default servers
pub const ROOT_USER_ID: i32 = 0;
