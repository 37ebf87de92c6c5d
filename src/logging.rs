use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::stderr_buffer;

/// Environment variable that overrides both `--verbose` and `--log-level`.
pub const LOG_ENV: &str = "ETHICS_GRADE_LOG";

/// Filter directive for the given CLI flags, before the env override.
pub fn filter_directive(verbose: bool, log_level: Option<&str>) -> String {
    match (verbose, log_level) {
        (_, Some(level)) if level.contains('=') => level.to_string(),
        (_, Some(level)) => format!("ethics_grade={}", level),
        (true, None) => "ethics_grade=debug".to_string(),
        (false, None) => "ethics_grade=warn".to_string(),
    }
}

/// Initialize structured logging based on CLI arguments.
///
/// Output goes to stderr through the stderr buffer, so lines logged while
/// the dashboard is up are shown after it exits.
pub fn init_tracing(verbose: bool, log_level: Option<&str>) -> anyhow::Result<()> {
    let directive = filter_directive(verbose, log_level);
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&directive))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", directive, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(stderr_buffer::writer)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(())
}
