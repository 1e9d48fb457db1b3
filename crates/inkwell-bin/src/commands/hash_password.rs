// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use crate::accounts;
use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints an argon2 PHC string for use in `database.seed_accounts`.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match args.password {
        Some(password) if !args.stdin => password,
        _ => read_stdin_line()?,
    };
    if password.is_empty() {
        return Err(BinError::config("password must not be empty"));
    }

    println!("{}", accounts::hash_password(&password)?);
    Ok(())
}

fn read_stdin_line() -> BinResult<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
