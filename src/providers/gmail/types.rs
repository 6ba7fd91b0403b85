//! Wire types for the Gmail REST API.
//!
//! Every field is optional: the API omits fields freely depending on the
//! requested format, and a partial message must never fail to deserialize.
//! Downstream code reads missing headers and bodies as empty values instead.

use serde::Deserialize;

/// Requested detail level for message fetches.
///
/// `Full` includes the payload tree with bodies; `Metadata` carries headers
/// only; `Minimal` is just ids and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    #[default]
    Full,
    Metadata,
    Minimal,
}

impl MessageFormat {
    /// The query parameter value the API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Full => "full",
            MessageFormat::Metadata => "metadata",
            MessageFormat::Minimal => "minimal",
        }
    }
}

/// A single message as returned by `users.messages.get`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: Option<String>,
    pub thread_id: Option<String>,
    pub label_ids: Option<Vec<String>>,
    /// Short, HTML-entity-encoded preview of the message text.
    pub snippet: Option<String>,
    /// Delivery time as epoch milliseconds, serialized as a string.
    pub internal_date: Option<String>,
    pub payload: Option<MessagePart>,
    pub size_estimate: Option<u64>,
}

impl RawMessage {
    /// Case-insensitive header lookup on the top-level payload.
    ///
    /// Missing payloads, headers, or values all read as the empty string.
    pub fn header(&self, name: &str) -> &str {
        self.payload
            .as_ref()
            .and_then(|payload| payload.header(name))
            .unwrap_or("")
    }
}

/// One node of a MIME payload tree.
///
/// The top-level payload and every nested part share this shape; multipart
/// nodes carry their children in `parts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    pub part_id: Option<String>,
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessageBody>,
    pub parts: Option<Vec<MessagePart>>,
}

impl MessagePart {
    /// Case-insensitive lookup of a header value on this part.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.iter().find_map(|header| {
            let matches = header
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name));
            if matches {
                header.value.as_deref()
            } else {
                None
            }
        })
    }
}

/// A single RFC 2822 header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Body content of a payload node, base64url-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub attachment_id: Option<String>,
    pub size: Option<u64>,
    pub data: Option<String>,
}

/// Response shape of `users.messages.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    pub messages: Option<Vec<MessageRef>>,
    pub next_page_token: Option<String>,
    pub result_size_estimate: Option<u64>,
}

/// A message reference from a list response; only ids, no content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    pub thread_id: Option<String>,
}
