//! In-memory message store.
//!
//! Reference [`MessageStore`] backed by a `Vec`, suitable for tests and
//! short-lived sessions. Feed order is date descending with the message id
//! as tie-break. The cursor positions by the cursor message's sort key, so
//! a page boundary survives the cursor message itself being archived out
//! of the filtered view.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::feed_service::{FeedError, FeedQuery, FeedResult, MessageStore};
use crate::domain::{Message, MessageId};

/// In-memory [`MessageStore`].
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages, newsletters or not.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Returns true when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn upsert(&self, message: &Message) -> FeedResult<()> {
        let mut messages = self.messages.lock().await;
        messages.retain(|m| m.id != message.id);
        messages.push(message.clone());
        Ok(())
    }

    async fn get(&self, id: &MessageId) -> FeedResult<Option<Message>> {
        Ok(self
            .messages
            .lock()
            .await
            .iter()
            .find(|m| &m.id == id)
            .cloned())
    }

    async fn list(&self, query: &FeedQuery) -> FeedResult<Vec<Message>> {
        let messages = self.messages.lock().await;

        let cursor_key = match &query.after {
            Some(id) => {
                let cursor = messages
                    .iter()
                    .find(|m| &m.id == id)
                    .ok_or_else(|| FeedError::NotFound(id.clone()))?;
                Some((cursor.date, cursor.id.clone()))
            }
            None => None,
        };

        let mut page: Vec<Message> = messages
            .iter()
            .filter(|m| query.matches(m))
            .filter(|m| match &cursor_key {
                Some((date, id)) => (m.date, &m.id) < (*date, id),
                None => true,
            })
            .cloned()
            .collect();

        page.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        page.truncate(query.limit);

        Ok(page)
    }

    async fn set_archived(&self, id: &MessageId, archived: bool) -> FeedResult<()> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| FeedError::NotFound(id.clone()))?;
        message.archived = archived;
        Ok(())
    }

    async fn set_resume(&self, id: &MessageId, resume: bool) -> FeedResult<()> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| FeedError::NotFound(id.clone()))?;
        message.resume = resume;
        Ok(())
    }
}
