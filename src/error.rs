use thiserror::Error;

/// Result type for dashboard core operations
pub type BoardResult<T> = Result<T, BoardError>;

/// Failure kinds surfaced by the discovery pipeline
#[derive(Error, Debug, Clone)]
pub enum BoardError {
    #[error("no queues found in the store")]
    NoQueuesFound,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("discovery exhausted after {attempts} attempts: {last_error}")]
    DiscoveryExhausted { attempts: u32, last_error: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BoardError {
    /// Check if a failed discovery attempt may be retried.
    ///
    /// Retry policy is a property of the error kind; the orchestrator
    /// consults it instead of deciding per call site.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoQueuesFound | Self::StoreUnavailable(_))
    }
}

impl From<redis::RedisError> for BoardError {
    fn from(err: redis::RedisError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_and_store_failures_are_retryable() {
        assert!(BoardError::NoQueuesFound.is_retryable());
        assert!(BoardError::StoreUnavailable("connection refused".to_string()).is_retryable());
    }

    #[test]
    fn exhaustion_and_config_errors_are_terminal() {
        let exhausted = BoardError::DiscoveryExhausted {
            attempts: 10,
            last_error: "no queues found in the store".to_string(),
        };
        assert!(!exhausted.is_retryable());
        assert!(!BoardError::InvalidConfig("bad protocol".to_string()).is_retryable());
    }
}
