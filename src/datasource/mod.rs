//! Record source abstraction for fetching deposit activity by tracking tag.

use crate::domain::{DepositRecord, TrackingTag};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod mock;
pub mod notion;

pub use mock::MockRecordSource;
pub use notion::{NotionConfig, NotionRecordSource};

/// External record store keyed by tracking tag.
///
/// Implementations must handle pagination and retry/backoff themselves and
/// return records that already went through normalization.
#[async_trait]
pub trait RecordSource: Send + Sync + fmt::Debug {
    /// Fetch every activity record attributed to `tag`.
    async fn fetch_records(
        &self,
        tag: &TrackingTag,
    ) -> Result<Vec<DepositRecord>, RecordSourceError>;
}

/// Error type for record source operations.
#[derive(Debug, Clone, Error)]
pub enum RecordSourceError {
    /// Connection timeout, DNS failure and the like.
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },
    /// Invalid JSON or unexpected response shape.
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Rate limited")]
    RateLimited,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_source_error_display() {
        let err = RecordSourceError::NetworkError("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = RecordSourceError::HttpError {
            status: 429,
            message: "Too many requests".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too many requests");

        let err = RecordSourceError::ParseError("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid JSON");

        assert_eq!(RecordSourceError::RateLimited.to_string(), "Rate limited");
    }
}
