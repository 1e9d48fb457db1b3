// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the server (default)
//! - `validate`: Validate configuration file
//! - `version`: Show version information
//! - `hash-password`: Print an argon2 hash for a seed account

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use inkwell_config::{LogFormat, LogLevel};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Inkwell - authentication service for the Inkwell blog backend
#[derive(Parser, Debug)]
#[command(
    name = "inkwell",
    author = "Sylvex <contact@sylvex.io>",
    version = inkwell_core::VERSION,
    about = "Session authentication service for the Inkwell blog backend",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "inkwell.yaml",
        env = "INKWELL_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log format (text, json, compact). Overrides the config file.
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the Inkwell CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without connecting to any
    /// backend.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Hash a password for `database.seed_accounts`
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listening port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secrets omitted)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }
}

// =============================================================================
// Tests
// =============================================================================
