//! Cloud provider error types

use skyward_waiter::WaitError;
use std::time::Duration;
use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Object is in the trash: {0}")]
    ObjectInTrash(String),

    #[error("Rate limited by API{}", retry_after_suffix(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Handler not registered for resource type: {0}")]
    UnknownResourceType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Wait failed: {0}")]
    Wait(#[from] WaitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }

    /// Not found, or sitting in the trash
    pub fn is_gone(&self) -> bool {
        matches!(self, CloudError::NotFound(_) | CloudError::ObjectInTrash(_))
    }

    /// Whether the request may succeed if sent again unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            CloudError::RateLimited { .. } | CloudError::Transport(_) => true,
            CloudError::Api { status, .. } => *status >= 500 && *status != 501,
            _ => false,
        }
    }
}

fn retry_after_suffix(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {:?})", d),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CloudError::RateLimited { retry_after: None }.is_retryable());
        assert!(CloudError::Transport("reset".into()).is_retryable());
        assert!(
            CloudError::Api {
                status: 503,
                message: "unavailable".into()
            }
            .is_retryable()
        );
        assert!(
            !CloudError::Api {
                status: 501,
                message: "not implemented".into()
            }
            .is_retryable()
        );
        assert!(!CloudError::NotFound("fsv_1".into()).is_retryable());
    }

    #[test]
    fn test_gone() {
        assert!(CloudError::NotFound("x".into()).is_gone());
        assert!(CloudError::ObjectInTrash("x".into()).is_gone());
        assert!(!CloudError::InvalidConfig("x".into()).is_gone());
    }

    #[test]
    fn test_rate_limited_message() {
        let err = CloudError::RateLimited {
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(err.to_string(), "Rate limited by API (retry after 3s)");
    }
}
