use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Where the fundamentals sheet lives and which rows are never shown.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV export of the fundamentals sheet.
    pub path: PathBuf,
    /// Sectors dropped before screening (delisted and unlisted companies).
    pub excluded_sectors: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Fundamentals.csv"),
            excluded_sectors: vec!["zdelist".to_string(), "Non List".to_string()],
        }
    }
}

/// How chart values are labelled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places on ordinary value labels.
    pub decimals: u32,
    /// Decimal places on ratio labels such as PBV.
    pub ratio_decimals: u32,
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: 2,
            ratio_decimals: 1,
            format: OutputFormat::Table,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `info` or `analytics=debug`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
