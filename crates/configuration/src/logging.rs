use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "fundamentals.log";

/// Installs the global tracing subscriber.
///
/// Logs always go to stderr so that stdout stays clean for tables and JSON.
/// When a directory is configured a second, non-ANSI layer writes to a
/// daily-rolling file; the returned guard must be held until shutdown or
/// buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = build_filter(&config.level)?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            debug!(level = %config.level, directory = %directory.display(), "Logging to stderr and a daily file.");
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            debug!(level = %config.level, "Logging to stderr.");
            Ok(None)
        }
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| ConfigError::ValidationError(format!("invalid log level '{level}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directives() {
        // Only meaningful when RUST_LOG is not overriding the configured level.
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_filter("analytics=loud").is_err());
            assert!(build_filter("analytics=debug").is_ok());
        }
    }

    #[test]
    fn installs_the_subscriber_only_once() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).unwrap().is_none());
        assert!(matches!(init_logging(&config), Err(ConfigError::LoggingError(_))));
    }
}
