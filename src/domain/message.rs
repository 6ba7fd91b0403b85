//! Message domain types.
//!
//! Represents a classified newsletter message as it flows from the provider
//! through the classifier into the store and out to feed views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Contact, MessageId};

/// How a message was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The sender is on the curated allowlist.
    Important,
    /// Not allowlisted, but the message carries a List-Unsubscribe header.
    Other,
}

/// A classified message.
///
/// `category` is `None` for mail that is not a newsletter at all; such
/// messages may live in the underlying store but never appear in
/// newsletter views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned identifier.
    pub id: MessageId,
    /// Date the message was received.
    pub date: DateTime<Utc>,
    /// Parsed sender.
    pub from: Contact,
    /// Subject line.
    pub subject: String,
    /// Cleaned preview text.
    pub snippet: String,
    /// Decoded HTML body.
    pub body: String,
    /// Estimated reading time in minutes.
    pub time: u32,
    /// Classification result.
    pub category: Option<Category>,
    /// Whether the reader archived this message.
    pub archived: bool,
    /// Whether the reader started but did not finish this message.
    pub resume: bool,
}

impl Message {
    /// Returns true when the message classified as a newsletter.
    pub fn is_newsletter(&self) -> bool {
        self.category.is_some()
    }

    /// Returns true when the estimated reading time is at most `max_minutes`.
    pub fn is_quick_read(&self, max_minutes: u32) -> bool {
        self.time <= max_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(category: Option<Category>) -> Message {
        Message {
            id: MessageId::from("msg-1"),
            date: DateTime::from_timestamp_millis(1_609_459_200_000).unwrap(),
            from: Contact::new("Money Stuff", "money@example.com", ""),
            subject: "Everything Is Securities Fraud".to_string(),
            snippet: "Also index funds...".to_string(),
            body: "<p>body</p>".to_string(),
            time: 4,
            category,
            archived: false,
            resume: false,
        }
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Important).unwrap(),
            "\"important\""
        );
        assert_eq!(serde_json::to_string(&Category::Other).unwrap(), "\"other\"");

        let parsed: Category = serde_json::from_str("\"important\"").unwrap();
        assert_eq!(parsed, Category::Important);
    }

    #[test]
    fn newsletter_requires_category() {
        assert!(sample(Some(Category::Important)).is_newsletter());
        assert!(sample(Some(Category::Other)).is_newsletter());
        assert!(!sample(None).is_newsletter());
    }

    #[test]
    fn quick_read_threshold() {
        let message = sample(Some(Category::Other));
        assert!(message.is_quick_read(5));
        assert!(message.is_quick_read(4));
        assert!(!message.is_quick_read(3));
    }

    #[test]
    fn message_serialization_roundtrip() {
        let message = sample(Some(Category::Important));
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"category\":\"important\""));

        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, message.id);
        assert_eq!(deserialized.category, Some(Category::Important));
    }
}
