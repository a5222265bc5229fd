// Error types for the scoring service

use scoring_cache::CacheError;
use scoring_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_logger_error_converts() {
        let _ = scoring_log::install_log_bridge();
        let err: ServerError = scoring_log::install_log_bridge().unwrap_err().into();

        assert!(matches!(err, ServerError::Logger(_)));
        assert!(err.to_string().starts_with("Logger error: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_internal_error_display() {
        let err = ServerError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
