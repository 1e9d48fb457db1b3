// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the server.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .port(args.port)
        .build()?;

    let logging = &runtime.config().logging;
    init_logging(
        cli.log_level.unwrap_or(logging.level),
        cli.log_format.unwrap_or(logging.format),
    )?;

    runtime.run().await
}
