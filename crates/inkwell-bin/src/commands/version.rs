// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints crate versions and the backends this build can use.
pub fn version(_cli: &Cli) -> BinResult<()> {
    let mut backends = vec!["memory"];
    backends.extend(inkwell_store::compiled_backends());

    println!("inkwell {}", crate::VERSION);
    println!();
    println!("Crates:");
    println!("  inkwell-core    {}", inkwell_core::VERSION);
    println!("  inkwell-store   {}", inkwell_store::VERSION);
    println!("  inkwell-api     {}", inkwell_api::VERSION);
    println!("  inkwell-config  {}", inkwell_config::VERSION);
    println!();
    println!("Backends: {}", backends.join(", "));
    println!("Platform: {}-{}", std::env::consts::ARCH, std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");

    Ok(())
}
