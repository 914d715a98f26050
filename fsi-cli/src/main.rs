// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! FSI catalog command-line entry point

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        cli.log_level
            .map(log::LevelFilter::from)
            .unwrap_or(log::LevelFilter::Warn)
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let result = match cli.command {
        Commands::Open => cli::handle_open(&cli.store),
        Commands::Server { action } => cli::handle_server(&cli.store, action),
        Commands::ForeignTable { action } => cli::handle_foreign_table(&cli.store, action),
        Commands::Table { action } => cli::handle_table(&cli.store, action),
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}
