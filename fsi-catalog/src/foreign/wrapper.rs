// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Data wrapper variants and their option descriptors

use super::options::ForeignOptions;
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};

pub const STORAGE_TYPE_KEY: &str = "STORAGE_TYPE";
pub const BASE_PATH_KEY: &str = "BASE_PATH";
pub const LOCAL_FILE_STORAGE_TYPE: &str = "LOCAL_FILE";

pub const CSV_WRAPPER_NAME: &str = "OMNISCI_CSV";
pub const PARQUET_WRAPPER_NAME: &str = "OMNISCI_PARQUET";

/// Built-in data wrappers a foreign server can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataWrapperKind {
    Csv,
    Parquet,
}

/// Option requirements of a data wrapper
///
/// `supported_*` lists of `None` accept any key.
#[derive(Debug, Clone, Copy)]
pub struct WrapperDescriptor {
    pub name: &'static str,
    pub required_server_options: &'static [&'static str],
    pub supported_server_options: Option<&'static [&'static str]>,
    pub required_table_options: &'static [&'static str],
    pub supported_table_options: Option<&'static [&'static str]>,
}

const SERVER_OPTIONS: &[&str] = &[STORAGE_TYPE_KEY, BASE_PATH_KEY];

static CSV_DESCRIPTOR: WrapperDescriptor = WrapperDescriptor {
    name: CSV_WRAPPER_NAME,
    required_server_options: &[],
    supported_server_options: Some(SERVER_OPTIONS),
    required_table_options: &[],
    supported_table_options: None,
};

static PARQUET_DESCRIPTOR: WrapperDescriptor = WrapperDescriptor {
    name: PARQUET_WRAPPER_NAME,
    required_server_options: &[],
    supported_server_options: Some(SERVER_OPTIONS),
    required_table_options: &[],
    supported_table_options: None,
};

impl DataWrapperKind {
    pub const ALL: [DataWrapperKind; 2] = [DataWrapperKind::Csv, DataWrapperKind::Parquet];

    pub fn descriptor(self) -> &'static WrapperDescriptor {
        match self {
            DataWrapperKind::Csv => &CSV_DESCRIPTOR,
            DataWrapperKind::Parquet => &PARQUET_DESCRIPTOR,
        }
    }

    /// Canonical name persisted in the catalog
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl std::str::FromStr for DataWrapperKind {
    type Err = CatalogError;

    /// Accepts the canonical name or the short form, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            CSV_WRAPPER_NAME | "CSV" => Ok(DataWrapperKind::Csv),
            PARQUET_WRAPPER_NAME | "PARQUET" => Ok(DataWrapperKind::Parquet),
            _ => Err(CatalogError::UnknownWrapper(s.to_string())),
        }
    }
}

impl std::fmt::Display for DataWrapperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl WrapperDescriptor {
    pub fn validate_server_options(&self, options: &ForeignOptions) -> CatalogResult<()> {
        validate(
            self.name,
            options,
            self.required_server_options,
            self.supported_server_options,
        )
    }

    pub fn validate_table_options(&self, options: &ForeignOptions) -> CatalogResult<()> {
        validate(
            self.name,
            options,
            self.required_table_options,
            self.supported_table_options,
        )
    }
}

fn validate(
    wrapper: &str,
    options: &ForeignOptions,
    required: &[&str],
    supported: Option<&[&str]>,
) -> CatalogResult<()> {
    if let Some(missing) = required.iter().find(|key| !options.contains_key(key)) {
        return Err(CatalogError::MissingRequiredOption {
            wrapper: wrapper.to_string(),
            option: missing.to_string(),
        });
    }

    if let Some(supported) = supported {
        if let Some(unknown) = options.keys().find(|key| !supported.contains(key)) {
            return Err(CatalogError::UnsupportedOption {
                wrapper: wrapper.to_string(),
                option: unknown.to_string(),
            });
        }
    }

    Ok(())
}
