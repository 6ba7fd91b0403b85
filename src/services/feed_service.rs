//! Feed service for the newsletter reading view.
//!
//! The feed service owns the sync-classify-store pipeline and the queries
//! the reading views are built from:
//! - Syncing mailbox pages into the store (list, batch-fetch, classify)
//! - Paging through the feed with filters and a cursor
//! - Flagging messages as archived or to-resume
//!
//! Storage is behind the [`MessageStore`] trait; the provider side needs
//! both [`MessageLister`] and [`MessageFetcher`].

use async_trait::async_trait;
use thiserror::Error;

use crate::allowlist::Allowlist;
use crate::classify;
use crate::config::Settings;
use crate::domain::{Message, MessageId, Subscriptions};
use crate::fetch::{fetch_all, FetchError};
use crate::providers::{MessageFetcher, MessageLister, Pagination, ProviderError};

/// Errors that can occur during feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Message not found.
    #[error("message not found: {0}")]
    NotFound(MessageId),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Batch fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Storage trait for classified messages.
///
/// `list` owns the feed's view semantics: newsletters only, ordered by
/// date descending, with the query's filters, cursor, and limit applied.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts or replaces a message by id.
    async fn upsert(&self, message: &Message) -> FeedResult<()>;

    /// Gets a message by id.
    async fn get(&self, id: &MessageId) -> FeedResult<Option<Message>>;

    /// Lists newsletters matching a query.
    async fn list(&self, query: &FeedQuery) -> FeedResult<Vec<Message>>;

    /// Sets the archived flag on a message.
    async fn set_archived(&self, id: &MessageId, archived: bool) -> FeedResult<()>;

    /// Sets the resume flag on a message.
    async fn set_resume(&self, id: &MessageId, resume: bool) -> FeedResult<()>;
}

/// Query over the newsletter feed.
///
/// The archived state is always filtered on: a view shows active mail or
/// the archive, never both. The remaining filters are opt-in.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    /// Match messages with this archived state.
    pub archived: bool,
    /// Only messages from this sender email.
    pub writer: Option<String>,
    /// Only messages readable within this many minutes.
    pub quick_read_under: Option<u32>,
    /// Only messages flagged to resume.
    pub resume: bool,
    /// Return messages strictly after this one in feed order.
    pub after: Option<MessageId>,
    /// Page size.
    pub limit: usize,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            archived: false,
            writer: None,
            quick_read_under: None,
            resume: false,
            after: None,
            limit: 5,
        }
    }
}

impl FeedQuery {
    /// Creates a query over the archive view.
    pub fn archived() -> Self {
        Self {
            archived: true,
            ..Default::default()
        }
    }

    /// Restricts the feed to one sender.
    pub fn writer(mut self, email: impl Into<String>) -> Self {
        self.writer = Some(email.into());
        self
    }

    /// Restricts the feed to quick reads within the given minutes.
    pub fn quick_reads(mut self, minutes: u32) -> Self {
        self.quick_read_under = Some(minutes);
        self
    }

    /// Restricts the feed to messages flagged to resume.
    pub fn resume(mut self) -> Self {
        self.resume = true;
        self
    }

    /// Starts the page after the given message.
    pub fn after(mut self, id: MessageId) -> Self {
        self.after = Some(id);
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Tests the filters only; ordering, cursor, and limit are the store's
    /// concern.
    pub fn matches(&self, message: &Message) -> bool {
        if !message.is_newsletter() {
            return false;
        }

        if message.archived != self.archived {
            return false;
        }

        if let Some(ref writer) = self.writer {
            if !message.from.email.eq_ignore_ascii_case(writer) {
                return false;
            }
        }

        if let Some(minutes) = self.quick_read_under {
            if !message.is_quick_read(minutes) {
                return false;
            }
        }

        if self.resume && !message.resume {
            return false;
        }

        true
    }
}

/// Counters from one sync page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Messages fetched from the provider.
    pub fetched: usize,
    /// Newsletters stored.
    pub stored: usize,
    /// Messages skipped: not newsletters, or not from subscribed senders.
    pub skipped: usize,
    /// Cursor for the next mailbox page, if any.
    pub next_page_token: Option<String>,
}

/// Service for the newsletter feed.
pub struct FeedService<S, P> {
    store: S,
    provider: P,
    allowlist: Allowlist,
    settings: Settings,
}

impl<S, P> FeedService<S, P>
where
    S: MessageStore,
    P: MessageLister + MessageFetcher,
{
    /// Creates a feed service using the builtin allowlist.
    pub fn new(store: S, provider: P, settings: Settings) -> Self {
        Self::with_allowlist(store, provider, settings, Allowlist::builtin().clone())
    }

    /// Creates a feed service with a custom allowlist.
    pub fn with_allowlist(store: S, provider: P, settings: Settings, allowlist: Allowlist) -> Self {
        Self {
            store,
            provider,
            allowlist,
            settings,
        }
    }

    /// Syncs one page of the mailbox into the store.
    ///
    /// Lists a page of ids, batch-fetches them under the quota, classifies
    /// each message, and stores the newsletters. With `subscriptions` given
    /// only newsletters from subscribed senders are stored; with `None`
    /// every newsletter on the page is stored. Returns the counters and the
    /// cursor for the next page.
    pub async fn sync(
        &self,
        subscriptions: Option<&Subscriptions>,
        page_token: Option<&str>,
    ) -> FeedResult<SyncOutcome> {
        let mut pagination = Pagination::with_limit(self.settings.feed.sync_batch);
        if let Some(token) = page_token {
            pagination = pagination.with_token(token);
        }

        let page = self.provider.list_ids(pagination).await?;
        if page.ids.is_empty() {
            tracing::debug!("mailbox page is empty, nothing to sync");
            return Ok(SyncOutcome {
                next_page_token: page.next_page_token,
                ..Default::default()
            });
        }

        let raw_messages = fetch_all(&self.provider, &page.ids, self.settings.quota).await?;

        let mut stored = 0;
        let mut skipped = 0;
        for raw in &raw_messages {
            let message = classify::message_from_raw(raw, &self.allowlist);
            let subscribed = subscriptions.map_or(true, |subs| subs.contains(&message.from.email));

            if message.is_newsletter() && subscribed {
                self.store.upsert(&message).await?;
                stored += 1;
            } else {
                skipped += 1;
            }
        }

        tracing::info!(
            fetched = raw_messages.len(),
            stored,
            skipped,
            "sync page complete"
        );

        Ok(SyncOutcome {
            fetched: raw_messages.len(),
            stored,
            skipped,
            next_page_token: page.next_page_token,
        })
    }

    /// Returns one feed page.
    pub async fn feed(&self, query: &FeedQuery) -> FeedResult<Vec<Message>> {
        self.store.list(query).await
    }

    /// Starts a feed query using the configured page size.
    pub fn query(&self) -> FeedQuery {
        FeedQuery::default().limit(self.settings.feed.page_size)
    }

    /// Starts a quick reads query using the configured threshold.
    pub fn quick_reads(&self) -> FeedQuery {
        self.query()
            .quick_reads(self.settings.feed.quick_read_minutes)
    }

    /// Gets a single message.
    pub async fn message(&self, id: &MessageId) -> FeedResult<Option<Message>> {
        self.store.get(id).await
    }

    /// Archives or unarchives a message.
    pub async fn set_archived(&self, id: &MessageId, archived: bool) -> FeedResult<()> {
        tracing::debug!(message_id = %id, archived, "updating archived flag");
        self.store.set_archived(id, archived).await
    }

    /// Flags or unflags a message to resume reading later.
    pub async fn set_resume(&self, id: &MessageId, resume: bool) -> FeedResult<()> {
        tracing::debug!(message_id = %id, resume, "updating resume flag");
        self.store.set_resume(id, resume).await
    }
}
