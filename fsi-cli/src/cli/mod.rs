// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for the FSI catalog
//!
//! Every command opens the catalog (running migrations for the requested
//! feature flag), performs one operation and closes it again.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_foreign_table, handle_open, handle_server, handle_table};
