// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use inkwell_config::{LogFormat, LogLevel};

use crate::error::{BinError, BinResult};

/// Directives keeping dependency chatter out of the application log.
const QUIET_DIRECTIVES: &[&str] = &["hyper=warn", "tower=warn", "tokio_postgres=info", "redis=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the global subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Example
///
/// ```ignore
/// use inkwell_bin::logging::init_logging;
/// use inkwell_config::{LogFormat, LogLevel};
///
/// init_logging(LogLevel::Info, LogFormat::Text)?;
/// ```
pub fn init_logging(level: LogLevel, format: LogFormat) -> BinResult<()> {
    let filter = build_filter(level);

    let result = match format {
        LogFormat::Text => {
            let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_ansi(is_terminal))
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).with_ansi(false))
            .try_init(),
    };

    result.map_err(|e| BinError::init(format!("failed to install logger: {}", e)))
}

fn build_filter(level: LogLevel) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    QUIET_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(filter, |filter, directive| filter.add_directive(directive))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_directives_parse() {
        for directive in QUIET_DIRECTIVES {
            assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok());
        }
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging(LogLevel::Warn, LogFormat::Compact);
        assert!(init_logging(LogLevel::Warn, LogFormat::Compact).is_err());
    }
}
