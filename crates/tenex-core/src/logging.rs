use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var consulted when `RUST_LOG` is unset.
pub const LOG_ENV_VAR: &str = "TENEX_LOG";

/// Helper macro for logging elapsed time at trace level.
///
/// Usage:
/// ```rust,ignore
/// let start = Instant::now();
/// // ... some work ...
/// trace_time!(start, "fetch_events");
/// // Or with additional fields:
/// trace_time!(start, "fetch_events", relay = url);
/// ```
#[macro_export]
macro_rules! trace_time {
    ($start:expr, $name:expr) => {
        tracing::trace!(elapsed = ?$start.elapsed(), $name);
    };
    ($start:expr, $name:expr $(, $field:ident = $value:expr)*) => {
        tracing::trace!(elapsed = ?$start.elapsed(), $($field = $value),*, $name);
    };
}

/// Initialize structured logging based on CLI arguments.
///
/// Everything goes to stderr: stdout carries command output and, in `mcp`
/// mode, the JSON-RPC channel.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
    log_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "warn",
    };

    init_with_level(level, log_json)
}

fn filter_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("tenex_core={level},tenex_tools={level}")
    }
}

fn init_with_level(level: &str, log_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV_VAR))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
