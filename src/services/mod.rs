//! Business services layer.
//!
//! This module contains the core services that orchestrate business logic,
//! coordinating between providers, storage, and domain types.
//!
//! # Architecture
//!
//! Services sit between the application layer and the infrastructure layer:
//!
//! ```text
//! Application Layer (UI, Actions, Events)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! # Services Overview
//!
//! - [`FeedService`]: Syncs the mailbox into the feed and serves feed queries
//! - [`SubscriptionService`]: Discovers newsletter senders for onboarding
//! - [`MemoryStore`]: In-memory [`MessageStore`] for tests and local runs

mod feed_service;
mod memory_store;
mod subscription_service;

pub use feed_service::{
    FeedError, FeedQuery, FeedResult, FeedService, MessageStore, SyncOutcome,
};
pub use memory_store::MemoryStore;
pub use subscription_service::{SubscriptionPage, SubscriptionService};
