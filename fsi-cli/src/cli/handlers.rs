// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for the FSI catalog

use colored::Colorize;
use fsi_catalog::{Catalog, ColumnDescriptor, ForeignOptions, SchemaPresence};

use super::commands::{ForeignTableAction, ServerAction, StoreArgs, TableAction};
use super::output::CatalogFormatter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the catalog for a single command; it closes when dropped
fn open_catalog(store: &StoreArgs) -> Result<Catalog, Box<dyn std::error::Error>> {
    let config = store.to_config();
    let mut catalog = Catalog::new();
    catalog.open_with_config(&config)?;
    Ok(catalog)
}

fn columns(raw: Vec<(String, String)>) -> Vec<ColumnDescriptor> {
    raw.into_iter()
        .map(|(name, sql_type)| ColumnDescriptor::new(name, sql_type))
        .collect()
}

fn options(raw: Vec<(String, String)>) -> ForeignOptions {
    raw.into_iter().collect()
}

/// Handle the open command
pub fn handle_open(store: &StoreArgs) -> CliResult {
    let catalog = open_catalog(store)?;

    let presence = match catalog.schema_presence()? {
        SchemaPresence::Present => "present".green(),
        SchemaPresence::Absent => "absent".yellow(),
        SchemaPresence::Partial { .. } => "partial".red(),
    };
    println!(
        "{}",
        format!("Catalog ready at {:?}", store.path).bold().green()
    );
    println!("  Foreign storage tables: {}", presence);
    println!("  Tables: {}", catalog.tables()?.list().len());

    if catalog.is_fsi_enabled() {
        println!(
            "  Foreign servers: {}",
            catalog.foreign_servers()?.list().len()
        );
        println!(
            "  Foreign tables: {}",
            catalog.foreign_tables()?.list().len()
        );
    } else {
        println!("{}", "  Foreign storage is disabled".yellow());
    }
    Ok(())
}

/// Handle the server subcommands
pub fn handle_server(store: &StoreArgs, action: ServerAction) -> CliResult {
    let catalog = open_catalog(store)?;
    let servers = catalog.foreign_servers()?;

    match action {
        ServerAction::List { format } => {
            println!("{}", CatalogFormatter::servers(&servers.list(), format));
        }
        ServerAction::Create {
            name,
            wrapper,
            options: raw,
        } => {
            let server = servers.create(&name, &wrapper, store.owner, options(raw))?;
            println!(
                "{}",
                format!(
                    "Created foreign server '{}' (id {}, {})",
                    server.name, server.id, server.data_wrapper
                )
                .green()
            );
        }
        ServerAction::Drop { name } => {
            servers.drop(&name)?;
            println!("{}", format!("Dropped foreign server '{}'", name).green());
        }
    }
    Ok(())
}

/// Handle the foreign-table subcommands
pub fn handle_foreign_table(store: &StoreArgs, action: ForeignTableAction) -> CliResult {
    let catalog = open_catalog(store)?;
    let foreign_tables = catalog.foreign_tables()?;

    match action {
        ForeignTableAction::List { format } => {
            let servers = catalog.foreign_servers()?;
            let server_name = |id: u32| {
                servers
                    .get_by_id(id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| format!("#{}", id))
            };
            println!(
                "{}",
                CatalogFormatter::foreign_tables(&foreign_tables.list(), server_name, format)
            );
        }
        ForeignTableAction::Create {
            name,
            server,
            columns: raw_columns,
            options: raw_options,
        } => {
            let table = foreign_tables.create(
                &name,
                &server,
                columns(raw_columns),
                options(raw_options),
                store.owner,
            )?;
            println!(
                "{}",
                format!(
                    "Created foreign table '{}' (id {}) on server '{}'",
                    table.name, table.table_id, server
                )
                .green()
            );
        }
        ForeignTableAction::Drop { name } => {
            foreign_tables.drop(&name)?;
            println!("{}", format!("Dropped foreign table '{}'", name).green());
        }
    }
    Ok(())
}

/// Handle the table subcommands
pub fn handle_table(store: &StoreArgs, action: TableAction) -> CliResult {
    let catalog = open_catalog(store)?;
    let tables = catalog.tables()?;

    match action {
        TableAction::List { format } => {
            println!("{}", CatalogFormatter::tables(&tables.list(), format));
        }
        TableAction::Create {
            name,
            columns: raw_columns,
        } => {
            let table = tables.create_table(&name, columns(raw_columns), store.owner)?;
            println!(
                "{}",
                format!("Created table '{}' (id {})", table.name, table.table_id).green()
            );
        }
        TableAction::CreateView { name, query } => {
            let view = tables.create_view(&name, &query, store.owner)?;
            println!(
                "{}",
                format!("Created view '{}' (id {})", view.name, view.table_id).green()
            );
        }
        TableAction::Drop { name } => {
            tables.drop_table(&name)?;
            println!("{}", format!("Dropped '{}'", name).green());
        }
    }
    Ok(())
}
