//! Macros for command dispatch tracing

/// Trace a phase of command execution when `--verbose` is set
///
/// Usage:
/// ```ignore
/// trace_command!(cli, start, "open_db");
/// ```
macro_rules! trace_command {
    ($cli:expr, $start:expr, $label:expr) => {
        if $cli.verbose {
            ::tracing::debug!(elapsed = ?$start.elapsed(), $label);
        }
    };
}

pub(crate) use trace_command;
