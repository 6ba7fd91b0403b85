//! Gmail REST API client.
//!
//! A thin, retrying HTTP client over the two endpoints the crate needs:
//! `users.messages.list` for id pages and `users.messages.get` for full
//! messages. The caller supplies an OAuth access token; token acquisition
//! and refresh happen outside this crate.
//!
//! Transient failures (connection drops, 429s, 5xx) are retried with
//! exponential backoff before an error is surfaced, so batch fetching can
//! treat any returned error as final.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::types::{MessageFormat, MessageList, RawMessage};
use crate::providers::traits::{
    MessageFetcher, MessageIdPage, MessageLister, Pagination, ProviderError, Result,
};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Total tries per request, the first attempt included.
const MAX_ATTEMPTS: u32 = 4;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Client for the Gmail REST API.
pub struct GmailClient {
    client: reqwest::Client,
    access_token: String,
    format: MessageFormat,
}

impl GmailClient {
    /// Creates a client that authenticates with the given OAuth access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            format: MessageFormat::default(),
        }
    }

    /// Sets the detail level requested on message fetches.
    ///
    /// Defaults to [`MessageFormat::Full`]. Subscription scans only need
    /// headers and can use [`MessageFormat::Metadata`] to cut payload size.
    pub fn with_format(mut self, format: MessageFormat) -> Self {
        self.format = format;
        self
    }

    /// Fetches a single message by id at the configured format.
    pub async fn get_message(&self, id: &str) -> Result<RawMessage> {
        let url = message_url(id, self.format)?;
        self.get_with_retry(&url).await
    }

    /// Lists one page of mailbox message references, newest first.
    pub async fn list_messages(&self, pagination: &Pagination) -> Result<MessageList> {
        let url = list_url(pagination)?;
        self.get_with_retry(&url).await
    }

    /// Makes an authenticated GET request, retrying transient failures.
    async fn get_with_retry<T: for<'de> Deserialize<'de>>(&self, url: &Url) -> Result<T> {
        let mut attempts = 0;
        let mut delay = INITIAL_RETRY_DELAY;

        loop {
            attempts += 1;
            match self.get(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempts < MAX_ATTEMPTS => {
                    let wait = retry_wait(&err, delay);
                    tracing::warn!(
                        attempt = attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "transient Gmail API error, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Makes a single authenticated GET request to the Gmail API.
    async fn get<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        let headers = self.auth_headers()?;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Builds authorization headers for API requests.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))
                .map_err(|e| ProviderError::Authentication(format!("invalid access token: {}", e)))?,
        );
        Ok(headers)
    }

    /// Handles API response, checking for errors.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("parse response: {}", e)))
    }
}

#[async_trait]
impl MessageFetcher for GmailClient {
    async fn fetch_one(&self, id: &str) -> Result<RawMessage> {
        tracing::debug!(message_id = %id, "fetching Gmail message");
        self.get_message(id).await
    }
}

#[async_trait]
impl MessageLister for GmailClient {
    async fn list_ids(&self, pagination: Pagination) -> Result<MessageIdPage> {
        let list = self.list_messages(&pagination).await?;
        let ids: Vec<String> = list
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|message| message.id)
            .collect();

        tracing::debug!(
            count = ids.len(),
            has_next = list.next_page_token.is_some(),
            "listed Gmail message ids"
        );

        Ok(MessageIdPage {
            ids,
            next_page_token: list.next_page_token,
        })
    }
}

/// Maps an API error response to a [`ProviderError`].
async fn handle_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let body = response.text().await.unwrap_or_default();

    error_for_status(status, retry_after, body)
}

fn error_for_status(status: u16, retry_after_secs: Option<u64>, body: String) -> ProviderError {
    match status {
        400 => ProviderError::InvalidRequest(body),
        401 | 403 => ProviderError::Authentication(format!("unauthorized ({}): {}", status, body)),
        404 => ProviderError::NotFound(body),
        429 => ProviderError::RateLimited { retry_after_secs },
        _ => ProviderError::Internal(format!("API error ({}): {}", status, body)),
    }
}

/// Prefers the server-provided Retry-After over the backoff schedule.
fn retry_wait(err: &ProviderError, fallback: Duration) -> Duration {
    match err {
        ProviderError::RateLimited {
            retry_after_secs: Some(secs),
        } => Duration::from_secs(*secs),
        _ => fallback,
    }
}

fn message_url(id: &str, format: MessageFormat) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/messages/{}", GMAIL_API_BASE, id))
        .map_err(|e| ProviderError::InvalidRequest(format!("invalid message id {:?}: {}", id, e)))?;
    url.query_pairs_mut().append_pair("format", format.as_str());
    Ok(url)
}

fn list_url(pagination: &Pagination) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/messages", GMAIL_API_BASE))
        .map_err(|e| ProviderError::Internal(format!("invalid url: {}", e)))?;

    // query_pairs_mut leaves a dangling `?` when nothing is appended.
    if pagination.limit.is_none() && pagination.page_token.is_none() {
        return Ok(url);
    }

    {
        let mut query = url.query_pairs_mut();
        if let Some(limit) = pagination.limit {
            query.append_pair("maxResults", &limit.to_string());
        }
        if let Some(token) = &pagination.page_token {
            query.append_pair("pageToken", token);
        }
    }

    Ok(url)
}
