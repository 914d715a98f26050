// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog listing formatters

use super::commands::OutputFormat;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fsi_catalog::{ForeignOptions, ForeignServer, ForeignTable, TableDescriptor};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

pub struct CatalogFormatter;

impl CatalogFormatter {
    pub fn servers(servers: &[Arc<ForeignServer>], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut table = new_table(&["id", "name", "wrapper", "owner", "options"]);
                for server in servers {
                    table.add_row(vec![
                        server.id.to_string(),
                        server.name.clone(),
                        server.data_wrapper.to_string(),
                        server.owner_id.to_string(),
                        format_options(&server.options),
                    ]);
                }
                table.to_string()
            }
            OutputFormat::Json => to_json(servers.iter().map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "data_wrapper": s.data_wrapper.name(),
                    "owner_id": s.owner_id,
                    "options": s.options,
                })
            })),
        }
    }

    /// Server names are resolved through `server_name`
    pub fn foreign_tables(
        tables: &[Arc<ForeignTable>],
        server_name: impl Fn(u32) -> String,
        format: OutputFormat,
    ) -> String {
        match format {
            OutputFormat::Table => {
                let mut table = new_table(&["id", "name", "server", "columns", "options"]);
                for ft in tables {
                    table.add_row(vec![
                        ft.table_id.to_string(),
                        ft.name.clone(),
                        server_name(ft.server_id),
                        format_columns(ft.columns.iter().map(|c| (&c.name, &c.sql_type))),
                        format_options(&ft.options),
                    ]);
                }
                table.to_string()
            }
            OutputFormat::Json => to_json(tables.iter().map(|ft| {
                json!({
                    "table_id": ft.table_id,
                    "name": ft.name,
                    "server": server_name(ft.server_id),
                    "columns": ft.columns,
                    "options": ft.options,
                })
            })),
        }
    }

    pub fn tables(tables: &[Arc<TableDescriptor>], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut table = new_table(&["id", "name", "kind", "owner", "definition"]);
                for t in tables {
                    let definition = match &t.view_sql {
                        Some(sql) => sql.clone(),
                        None => format_columns(t.columns.iter().map(|c| (&c.name, &c.sql_type))),
                    };
                    table.add_row(vec![
                        t.table_id.to_string(),
                        t.name.clone(),
                        t.kind.label().to_string(),
                        t.owner_id.to_string(),
                        definition,
                    ]);
                }
                table.to_string()
            }
            OutputFormat::Json => to_json(tables.iter().map(|t| json!(t.as_ref()))),
        }
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

fn to_json(rows: impl Iterator<Item = JsonValue>) -> String {
    let rows: Vec<JsonValue> = rows.collect();
    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

fn format_options(options: &ForeignOptions) -> String {
    options
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_columns<'a>(columns: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    columns
        .map(|(name, sql_type)| format!("{} {}", name, sql_type))
        .collect::<Vec<_>>()
        .join(", ")
}
