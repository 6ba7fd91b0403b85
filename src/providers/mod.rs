//! Mailbox provider implementations.
//!
//! This module contains the provider traits and the Gmail implementation:
//!
//! - [`MessageLister`] - pages through remote message ids
//! - [`MessageFetcher`] - fetches one full message by id
//! - [`gmail`] - Gmail REST API client and wire types
//!
//! # Example
//!
//! ```ignore
//! use veranda::providers::{MessageLister, Pagination};
//! use veranda::providers::gmail::GmailClient;
//!
//! async fn first_page(client: &GmailClient) {
//!     let page = client
//!         .list_ids(Pagination::with_limit(100))
//!         .await
//!         .expect("failed to list messages");
//!
//!     for id in &page.ids {
//!         println!("{}", id);
//!     }
//! }
//! ```

pub mod gmail;
mod traits;

pub use traits::{
    MessageFetcher, MessageIdPage, MessageLister, Pagination, ProviderError, Result,
};

#[cfg(test)]
pub use traits::MockMessageFetcher;
