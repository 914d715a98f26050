// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Foreign storage metadata
//!
//! This module provides:
//! - Data wrapper variants with typed option descriptors
//! - The options container persisted with servers and tables
//! - The foreign server registry and its default-server bootstrap
//! - The foreign table registry and the disable cascade

pub mod options;
pub mod server;
pub mod table;
pub mod wrapper;

pub use options::ForeignOptions;
pub use server::{ForeignServer, ForeignServerRegistry, DEFAULT_SERVERS};
pub use table::{ForeignTable, ForeignTableRegistry};
pub use wrapper::{
    DataWrapperKind, WrapperDescriptor, BASE_PATH_KEY, CSV_WRAPPER_NAME,
    LOCAL_FILE_STORAGE_TYPE, PARQUET_WRAPPER_NAME, STORAGE_TYPE_KEY,
};
