//! Subscription domain types.
//!
//! A subscription is a newsletter sender the user follows. The set of
//! subscriptions decides which newsletters land in the feed.

use serde::{Deserialize, Serialize};

use super::{Category, Contact};

/// A newsletter sender discovered in the mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// The sender this subscription tracks.
    pub from: Contact,
    /// Classification of the sender's messages.
    pub category: Category,
    /// Whether the subscription is pre-selected during onboarding.
    ///
    /// Allowlisted (important) senders start selected.
    pub selected: bool,
}

impl Subscription {
    /// Creates a subscription, pre-selecting important senders.
    pub fn new(from: Contact, category: Category) -> Self {
        Self {
            from,
            category,
            selected: category == Category::Important,
        }
    }
}

/// The user's chosen newsletters, keyed by sender email.
///
/// Membership checks are case-insensitive; adding is idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscriptions(Vec<Subscription>);

impl Subscriptions {
    /// Creates an empty subscription list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a sender with this email is subscribed.
    pub fn contains(&self, email: &str) -> bool {
        self.0.iter().any(|s| s.from.email.eq_ignore_ascii_case(email))
    }

    /// Adds a subscription unless the sender is already present.
    pub fn add(&mut self, subscription: Subscription) {
        if !self.contains(&subscription.from.email) {
            self.0.push(subscription);
        }
    }

    /// Removes the subscription for a sender email, if present.
    pub fn remove(&mut self, email: &str) {
        self.0.retain(|s| !s.from.email.eq_ignore_ascii_case(email));
    }

    /// Number of subscriptions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the user follows no newsletters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the subscriptions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.0.iter()
    }
}

impl FromIterator<Subscription> for Subscriptions {
    fn from_iter<I: IntoIterator<Item = Subscription>>(iter: I) -> Self {
        let mut subscriptions = Self::new();
        for subscription in iter {
            subscriptions.add(subscription);
        }
        subscriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: &str) -> Contact {
        Contact::new("Sender", email, "")
    }

    #[test]
    fn important_subscriptions_start_selected() {
        let sub = Subscription::new(contact("a@example.com"), Category::Important);
        assert!(sub.selected);

        let sub = Subscription::new(contact("b@example.com"), Category::Other);
        assert!(!sub.selected);
    }

    #[test]
    fn add_is_idempotent() {
        let mut subs = Subscriptions::new();
        subs.add(Subscription::new(contact("a@example.com"), Category::Other));
        subs.add(Subscription::new(contact("a@example.com"), Category::Other));

        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn contains_is_case_insensitive() {
        let mut subs = Subscriptions::new();
        subs.add(Subscription::new(contact("a@example.com"), Category::Other));

        assert!(subs.contains("A@Example.COM"));
        assert!(!subs.contains("b@example.com"));
    }

    #[test]
    fn remove_drops_sender() {
        let mut subs = Subscriptions::new();
        subs.add(Subscription::new(contact("a@example.com"), Category::Other));
        subs.add(Subscription::new(
            contact("b@example.com"),
            Category::Important,
        ));

        subs.remove("a@example.com");
        assert_eq!(subs.len(), 1);
        assert!(!subs.contains("a@example.com"));
        assert!(subs.contains("b@example.com"));
    }

    #[test]
    fn collect_dedupes() {
        let subs: Subscriptions = vec![
            Subscription::new(contact("a@example.com"), Category::Other),
            Subscription::new(contact("b@example.com"), Category::Important),
            Subscription::new(contact("a@example.com"), Category::Other),
        ]
        .into_iter()
        .collect();

        assert_eq!(subs.len(), 2);
    }
}
