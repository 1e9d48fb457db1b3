// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use inkwell_config::{ConfigLoader, DatabaseBackend, InkwellConfig, LogLevel, StoreBackend};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    init_logging(
        cli.log_level.unwrap_or(LogLevel::Warn),
        cli.log_format.unwrap_or_default(),
    )?;

    let config_path = &cli.config;
    let config = ConfigLoader::new().load(config_path)?;
    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen:        {}", config.server.socket_addr());
            println!("  Base path:     {}", config.server.base_path);
            println!("  Token window:  {}s", config.auth.validity.as_secs());
            println!("  Session store: {:?}", config.session_store.backend);
            println!("  Database:      {:?}", config.database.backend);

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("failed to render configuration: {}", e)))
}

/// Non-fatal issues worth surfacing before deployment.
fn collect_warnings(config: &InkwellConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.session_store.backend == StoreBackend::Memory {
        warnings.push("Sessions are kept in memory and lost on restart".to_string());
    }
    if config.database.backend == DatabaseBackend::Memory && config.database.seed_accounts.is_empty() {
        warnings.push("In-memory database has no seed accounts; nobody can log in".to_string());
    }
    if config.auth.secret.len() < 32 {
        warnings.push("auth.secret is shorter than 32 bytes".to_string());
    }

    warnings
}
