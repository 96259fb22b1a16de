use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{Config, DatasetConfig, DisplayConfig, LoggingConfig, OutputFormat};

const ENV_PREFIX: &str = "FUNDAMENTALS";
const MAX_DECIMALS: u32 = 10;

/// Loads the application configuration.
///
/// With no explicit path, an optional `config.toml` in the working directory
/// is read. An explicit path must exist. Environment variables of the form
/// `FUNDAMENTALS__DATASET__PATH` override file values.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_with_environment(path, environment())
}

/// `FUNDAMENTALS__DISPLAY__DECIMALS` maps to `display.decimals`.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}

fn load_with_environment(path: Option<&Path>, environment: config::Environment) -> Result<Config, ConfigError> {
    let file_source = match path {
        Some(path) => config::File::from(path),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file_source)
        .add_source(environment)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.dataset.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "dataset.path must not be empty".to_string(),
        ));
    }
    for (key, value) in [
        ("display.decimals", config.display.decimals),
        ("display.ratio_decimals", config.display.ratio_decimals),
    ] {
        if value > MAX_DECIMALS {
            return Err(ConfigError::ValidationError(format!(
                "{key} must be at most {MAX_DECIMALS}, got {value}"
            )));
        }
    }
    Ok(())
}
