use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("No data available for {0}")]
    NoData(String),

    #[error("Failed to serialize dashboard: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DashboardError {
    /// An empty selection is an expected outcome, not a failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DashboardError::NoData(_))
    }
}
