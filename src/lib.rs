//! veranda - a newsletter-first reading core for Gmail mailboxes
//!
//! This crate provides the core functionality for a newsletter reading app:
//! quota-aware message fetching, sender classification against a curated
//! allowlist, and feed/subscription services over a pluggable message store.

pub mod allowlist;
pub mod classify;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod providers;
pub mod services;

pub use allowlist::Allowlist;
pub use fetch::Quota;
