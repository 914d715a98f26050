// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command definitions for the FSI catalog

use clap::{Args, Parser, Subcommand, ValueEnum};
use fsi_catalog::{CatalogConfig, StorageType, ROOT_USER_ID};
use std::path::PathBuf;

/// How much of the catalog's open/migrate/bootstrap activity to log
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Failed opens and corrupt schemas only
    Error,
    /// Also orphaned foreign tables and flush failures
    Warn,
    /// Also catalog open/close and migration steps
    Info,
    /// Also migration outcomes and shared store handles
    Debug,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

/// FSI catalog CLI - inspect and edit foreign storage metadata
#[derive(Parser)]
#[command(name = "fsi-catalog")]
#[command(about = "Manage foreign servers and foreign tables in a catalog store")]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how to open the catalog
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Catalog path (directory, or a .redb file)
    #[arg(long, global = true, default_value = "./catalog")]
    pub path: PathBuf,

    /// Storage backend (redb, memory); FSI_CATALOG_STORAGE is used when unset
    #[arg(long, global = true)]
    pub storage: Option<StorageType>,

    /// Open with foreign storage disabled, removing all foreign metadata
    #[arg(long, global = true)]
    pub disable_fsi: bool,

    /// Owner of default servers created on bootstrap
    #[arg(long, global = true, default_value_t = ROOT_USER_ID)]
    pub owner: i32,
}

impl StoreArgs {
    /// Foreign storage defaults to enabled; env vars apply before flags
    pub fn to_config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::new(&self.path)
            .with_fsi(true)
            .with_root_owner(self.owner)
            .with_env_overrides();
        if let Some(storage) = self.storage {
            config = config.with_storage_type(storage);
        }
        if self.disable_fsi {
            config = config.with_fsi(false);
        }
        config
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Open the catalog, applying migrations, and show its status
    Open,

    /// Foreign server commands
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },

    /// Foreign table commands
    ForeignTable {
        #[command(subcommand)]
        action: ForeignTableAction,
    },

    /// Ordinary table and view commands
    Table {
        #[command(subcommand)]
        action: TableAction,
    },
}

#[derive(Subcommand)]
pub enum ServerAction {
    /// List foreign servers
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a foreign server
    Create {
        name: String,

        /// Data wrapper (omnisci_csv, omnisci_parquet)
        #[arg(short, long)]
        wrapper: String,

        /// Server option as KEY=VALUE (repeatable)
        #[arg(short, long = "option", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },

    /// Drop a foreign server that no foreign table uses
    Drop { name: String },
}

#[derive(Subcommand)]
pub enum ForeignTableAction {
    /// List foreign tables
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a foreign table on an existing server
    Create {
        name: String,

        #[arg(short, long)]
        server: String,

        /// Column as NAME:TYPE (repeatable)
        #[arg(short, long = "column", value_parser = parse_column)]
        columns: Vec<(String, String)>,

        /// Table option as KEY=VALUE (repeatable)
        #[arg(short, long = "option", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },

    /// Drop a foreign table
    Drop { name: String },
}

#[derive(Subcommand)]
pub enum TableAction {
    /// List tables, views and foreign tables
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Create an ordinary table
    Create {
        name: String,

        /// Column as NAME:TYPE (repeatable)
        #[arg(short, long = "column", value_parser = parse_column)]
        columns: Vec<(String, String)>,
    },

    /// Create a view from a query
    CreateView { name: String, query: String },

    /// Drop a table or view
    Drop { name: String },
}

/// Output format options
#[derive(Clone, Copy, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("Expected KEY=VALUE, got '{}'", s)),
    }
}

fn parse_column(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, sql_type)) if !name.trim().is_empty() && !sql_type.trim().is_empty() => {
            Ok((name.trim().to_string(), sql_type.trim().to_uppercase()))
        }
        _ => Err(format!("Expected NAME:TYPE, got '{}'", s)),
    }
}
