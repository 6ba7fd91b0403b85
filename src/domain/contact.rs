//! Contact domain types.
//!
//! Represents the sender identity parsed out of a message's From header.

use serde::{Deserialize, Serialize};

/// A message sender.
///
/// Built by the classifier from the raw From header: the email is always
/// lowercased, and `photo_url` carries either a curated icon asset or a
/// favicon-service URL derived from the sending domain. It is empty only
/// when the header could not be parsed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name.
    pub name: String,
    /// Email address, lowercase.
    pub email: String,
    /// Icon URL for the sender.
    pub photo_url: String,
}

impl Contact {
    /// Creates a new contact.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        photo_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            photo_url: photo_url.into(),
        }
    }

    /// Returns the display representation of this contact.
    ///
    /// If the name differs from the email, returns "Name <email>",
    /// otherwise just the email.
    pub fn display(&self) -> String {
        if self.name.is_empty() || self.name == self.email {
            self.email.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_display_with_name() {
        let contact = Contact::new("Money Stuff", "money@example.com", "");
        assert_eq!(contact.display(), "Money Stuff <money@example.com>");
    }

    #[test]
    fn contact_display_without_name() {
        let contact = Contact::new("", "money@example.com", "");
        assert_eq!(contact.display(), "money@example.com");
    }

    #[test]
    fn contact_display_name_equals_email() {
        let contact = Contact::new("raw@example.com", "raw@example.com", "");
        assert_eq!(contact.display(), "raw@example.com");
    }

    #[test]
    fn contact_serialization() {
        let contact = Contact::new("Test", "test@example.com", "https://icons.test/a.png");
        let json = serde_json::to_string(&contact).unwrap();
        let deserialized: Contact = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, contact);
    }
}
