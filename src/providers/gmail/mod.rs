//! Gmail REST API provider.
//!
//! [`GmailClient`] implements [`MessageLister`](super::MessageLister) and
//! [`MessageFetcher`](super::MessageFetcher) over the Gmail `users.messages`
//! endpoints. The wire types in this module mirror the API's JSON shapes
//! with every field optional.

mod client;
mod types;

pub use client::GmailClient;
pub use types::{
    Header, MessageBody, MessageFormat, MessageList, MessagePart, MessageRef, RawMessage,
};
