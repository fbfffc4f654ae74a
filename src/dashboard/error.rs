//! Dashboard error types

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or driving a dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The driver task is gone and can no longer take commands
    #[error("Dashboard command channel closed")]
    ChannelClosed,

    /// The driver task panicked or was cancelled
    #[error("Dashboard task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DashboardError::ChannelClosed.to_string(),
            "Dashboard command channel closed"
        );

        let err: DashboardError = ConfigError::Invalid("bad".into()).into();
        assert_eq!(err.to_string(), "Configuration error: Invalid configuration: bad");
    }
}
