//! Subscription discovery over the mailbox.
//!
//! Scans pages of recent mail, classifies each message, and surfaces one
//! entry per newsletter sender so the reader can choose which ones make up
//! their feed. Header-only fetches are enough here; pair this service with
//! a client configured for the metadata format.

use std::collections::HashSet;

use crate::allowlist::Allowlist;
use crate::classify;
use crate::config::Settings;
use crate::domain::Subscription;
use crate::fetch::fetch_all;
use crate::providers::{MessageFetcher, MessageLister, Pagination};

use super::feed_service::FeedResult;

/// One page of discovered newsletter senders.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPage {
    /// Distinct newsletter senders, in first-seen order.
    pub subscriptions: Vec<Subscription>,
    /// Cursor for scanning the next mailbox page, if any.
    pub next_page_token: Option<String>,
}

/// Service for discovering newsletter subscriptions.
pub struct SubscriptionService<P> {
    provider: P,
    allowlist: Allowlist,
    settings: Settings,
}

impl<P> SubscriptionService<P>
where
    P: MessageLister + MessageFetcher,
{
    /// Creates a subscription service using the builtin allowlist.
    pub fn new(provider: P, settings: Settings) -> Self {
        Self::with_allowlist(provider, settings, Allowlist::builtin().clone())
    }

    /// Creates a subscription service with a custom allowlist.
    pub fn with_allowlist(provider: P, settings: Settings, allowlist: Allowlist) -> Self {
        Self {
            provider,
            allowlist,
            settings,
        }
    }

    /// Scans one mailbox page for newsletter senders.
    ///
    /// Senders are deduplicated by email, keeping the first occurrence,
    /// which is the newest message since the mailbox lists newest first.
    /// Allowlisted senders come back pre-selected.
    pub async fn list_page(&self, page_token: Option<&str>) -> FeedResult<SubscriptionPage> {
        let mut pagination = Pagination::with_limit(self.settings.feed.sync_batch);
        if let Some(token) = page_token {
            pagination = pagination.with_token(token);
        }

        let page = self.provider.list_ids(pagination).await?;
        if page.ids.is_empty() {
            return Ok(SubscriptionPage {
                next_page_token: page.next_page_token,
                ..Default::default()
            });
        }

        let raw_messages = fetch_all(&self.provider, &page.ids, self.settings.quota).await?;

        let mut seen = HashSet::new();
        let mut subscriptions = Vec::new();
        for raw in &raw_messages {
            let message = classify::message_from_raw(raw, &self.allowlist);
            let Some(category) = message.category else {
                continue;
            };
            if seen.insert(message.from.email.clone()) {
                subscriptions.push(Subscription::new(message.from, category));
            }
        }

        tracing::debug!(
            scanned = raw_messages.len(),
            found = subscriptions.len(),
            "subscription scan page complete"
        );

        Ok(SubscriptionPage {
            subscriptions,
            next_page_token: page.next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::providers::gmail::{Header, MessagePart, RawMessage};
    use crate::providers::{MessageIdPage, ProviderError, Result as ProviderResult};
    use crate::services::FeedError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    struct ScriptedProvider {
        page: MessageIdPage,
        messages: HashMap<String, RawMessage>,
        seen_pagination: Mutex<Option<Pagination>>,
    }

    impl ScriptedProvider {
        fn new(messages: Vec<RawMessage>, next_page_token: Option<&str>) -> Self {
            let page = MessageIdPage {
                ids: messages.iter().filter_map(|m| m.id.clone()).collect(),
                next_page_token: next_page_token.map(|t| t.to_string()),
            };
            let messages = messages
                .into_iter()
                .filter_map(|m| m.id.clone().map(|id| (id, m)))
                .collect();
            Self {
                page,
                messages,
                seen_pagination: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl MessageLister for ScriptedProvider {
        async fn list_ids(&self, pagination: Pagination) -> ProviderResult<MessageIdPage> {
            *self.seen_pagination.lock().unwrap() = Some(pagination);
            Ok(self.page.clone())
        }
    }

    #[async_trait]
    impl MessageFetcher for ScriptedProvider {
        async fn fetch_one(&self, id: &str) -> ProviderResult<RawMessage> {
            self.messages
                .get(id)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound(id.to_string()))
        }
    }

    fn raw(id: &str, headers: &[(&str, &str)]) -> RawMessage {
        RawMessage {
            id: Some(id.to_string()),
            payload: Some(MessagePart {
                headers: Some(
                    headers
                        .iter()
                        .map(|(name, value)| Header {
                            name: Some(name.to_string()),
                            value: Some(value.to_string()),
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn newsletter(id: &str, from: &str) -> RawMessage {
        raw(id, &[("From", from), ("List-Unsubscribe", "<mailto:u@x.com>")])
    }

    #[tokio::test]
    async fn dedupes_senders_keeping_first() {
        let provider = ScriptedProvider::new(
            vec![
                newsletter("m1", "Stratechery <email@stratechery.com>"),
                newsletter("m2", "Deals <deals@shopping.example>"),
                newsletter("m3", "Stratechery <email@stratechery.com>"),
            ],
            None,
        );
        let service = SubscriptionService::new(provider, Settings::default());

        let page = assert_ok!(service.list_page(None).await);
        let emails: Vec<_> = page
            .subscriptions
            .iter()
            .map(|s| s.from.email.as_str())
            .collect();
        assert_eq!(emails, vec!["email@stratechery.com", "deals@shopping.example"]);
    }

    #[tokio::test]
    async fn allowlisted_senders_arrive_selected() {
        let provider = ScriptedProvider::new(
            vec![
                newsletter("m1", "Stratechery <email@stratechery.com>"),
                newsletter("m2", "Deals <deals@shopping.example>"),
            ],
            None,
        );
        let service = SubscriptionService::new(provider, Settings::default());

        let page = assert_ok!(service.list_page(None).await);
        assert_eq!(page.subscriptions[0].category, Category::Important);
        assert!(page.subscriptions[0].selected);
        assert_eq!(page.subscriptions[1].category, Category::Other);
        assert!(!page.subscriptions[1].selected);
    }

    #[tokio::test]
    async fn skips_mail_that_is_not_a_newsletter() {
        let provider = ScriptedProvider::new(
            vec![
                raw("m1", &[("From", "A Friend <friend@gmail.com>")]),
                newsletter("m2", "Deals <deals@shopping.example>"),
            ],
            Some("scan-2"),
        );
        let service = SubscriptionService::new(provider, Settings::default());

        let page = assert_ok!(service.list_page(None).await);
        assert_eq!(page.subscriptions.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("scan-2"));
    }

    #[tokio::test]
    async fn empty_page_short_circuits() {
        let provider = ScriptedProvider::new(vec![], Some("scan-2"));
        let service = SubscriptionService::new(provider, Settings::default());

        let page = assert_ok!(service.list_page(None).await);
        assert!(page.subscriptions.is_empty());
        assert_eq!(page.next_page_token.as_deref(), Some("scan-2"));
    }

    #[tokio::test]
    async fn forwards_scan_batch_and_cursor() {
        let provider = ScriptedProvider::new(vec![], None);
        let service = SubscriptionService::new(provider, Settings::default());

        assert_ok!(service.list_page(Some("scan-3")).await);

        let seen = service
            .provider
            .seen_pagination
            .lock()
            .unwrap()
            .clone()
            .unwrap();
        assert_eq!(seen.limit, Some(Settings::default().feed.sync_batch));
        assert_eq!(seen.page_token.as_deref(), Some("scan-3"));
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        // The listing names an id the message table does not contain.
        let mut provider = ScriptedProvider::new(
            vec![newsletter("m1", "Deals <deals@shopping.example>")],
            None,
        );
        provider.page.ids.push("missing".to_string());
        let service = SubscriptionService::new(provider, Settings::default());

        let err = assert_err!(service.list_page(None).await);
        assert!(matches!(err, FeedError::Fetch(_)));
    }
}
