//! Mailbox provider trait definitions.
//!
//! This module defines the seams the rest of the crate is generic over:
//! [`MessageLister`] for paging through remote message ids and
//! [`MessageFetcher`] for pulling one full message. The fetch limiter only
//! ever sees a [`MessageFetcher`], so any backend that can fetch a message
//! by id can sit behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::gmail::RawMessage;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Authentication failed or the bearer token expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    /// Returns true for failures that may clear up on retry.
    ///
    /// Connection drops, rate limiting, and server-side errors are
    /// transient; bad credentials and bad requests are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Connection(_)
                | ProviderError::RateLimited { .. }
                | ProviderError::Internal(_)
        )
    }
}

/// Pagination parameters for list operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of items to return.
    pub limit: Option<u32>,
    /// Opaque cursor for the next page of results.
    pub page_token: Option<String>,
}

impl Pagination {
    /// Creates a new pagination with the specified limit.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            page_token: None,
        }
    }

    /// Creates pagination for the next page using the provided token.
    pub fn next_page(token: impl Into<String>) -> Self {
        Self {
            limit: None,
            page_token: Some(token.into()),
        }
    }

    /// Sets the page token, keeping the limit.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }
}

/// One page of message ids from a list operation.
#[derive(Debug, Clone, Default)]
pub struct MessageIdPage {
    /// Message ids in mailbox order (newest first).
    pub ids: Vec<String>,
    /// Cursor for the next page, if more messages exist.
    pub next_page_token: Option<String>,
}

/// Fetches one full message by id.
///
/// This is the only capability the fetch limiter requires. Implementations
/// own their retry policy: a transient failure should be retried inside
/// `fetch_one`, because the limiter treats any returned error as final for
/// the whole batch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    /// Fetches the message with the given provider id.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] if the message does not exist.
    async fn fetch_one(&self, id: &str) -> Result<RawMessage>;
}

/// Pages through remote message ids.
#[async_trait]
pub trait MessageLister: Send + Sync {
    /// Lists a page of message ids, newest first.
    async fn list_ids(&self, pagination: Pagination) -> Result<MessageIdPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_with_limit() {
        let page = Pagination::with_limit(100);
        assert_eq!(page.limit, Some(100));
        assert!(page.page_token.is_none());
    }

    #[test]
    fn pagination_next_page() {
        let page = Pagination::next_page("token123");
        assert!(page.limit.is_none());
        assert_eq!(page.page_token, Some("token123".to_string()));
    }

    #[test]
    fn pagination_with_token_keeps_limit() {
        let page = Pagination::with_limit(50).with_token("abc");
        assert_eq!(page.limit, Some(50));
        assert_eq!(page.page_token, Some("abc".to_string()));
    }

    #[test]
    fn provider_error_display() {
        let auth_err = ProviderError::Authentication("token expired".to_string());
        assert_eq!(auth_err.to_string(), "authentication failed: token expired");

        let rate_err = ProviderError::RateLimited {
            retry_after_secs: Some(60),
        };
        assert!(rate_err.to_string().contains("rate limit"));

        let not_found = ProviderError::NotFound("msg-123".to_string());
        assert!(not_found.to_string().contains("not found"));
    }

    #[test]
    fn transient_errors() {
        assert!(ProviderError::Connection("reset".into()).is_transient());
        assert!(ProviderError::RateLimited {
            retry_after_secs: None
        }
        .is_transient());
        assert!(ProviderError::Internal("500".into()).is_transient());

        assert!(!ProviderError::Authentication("expired".into()).is_transient());
        assert!(!ProviderError::NotFound("msg-1".into()).is_transient());
        assert!(!ProviderError::InvalidRequest("bad id".into()).is_transient());
    }
}
