//! Domain layer types for the newsletter reading core.
//!
//! This module contains the core domain types used throughout the crate:
//! message identity, sender contacts, classified messages, and the user's
//! subscription list.

mod contact;
mod message;
mod subscription;
mod types;

pub use contact::Contact;
pub use message::{Category, Message};
pub use subscription::{Subscription, Subscriptions};
pub use types::MessageId;
