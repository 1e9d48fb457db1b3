// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Inkwell - session authentication service for the Inkwell blog backend.

use inkwell_bin::cli::Cli;
use inkwell_bin::commands;
use inkwell_bin::error::report_error_and_exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}
