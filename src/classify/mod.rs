//! Newsletter classification.
//!
//! Pure functions that turn a raw Gmail message into a classified domain
//! [`Message`]: sender parsing, allowlist-driven categorization, icon
//! resolution, body extraction, and snippet cleanup. Everything in this
//! module is total over malformed input; a garbled message degrades to
//! empty fields instead of an error.
//!
//! Classification policy: a sender on the allowlist (by display name or by
//! full sending domain) is `important`. Anything else carrying a
//! `List-Unsubscribe` header is `other`. Mail with neither signal is not a
//! newsletter at all.

mod body;

pub use body::extract_body;

use chrono::{DateTime, Utc};

use crate::allowlist::Allowlist;
use crate::domain::{Category, Contact, Message, MessageId};
use crate::providers::gmail::RawMessage;

const FAVICON_BASE: &str = "https://www.google.com/s2/favicons";

/// Icon prefixes stripped from sending domains, checked in order. Only the
/// first match is stripped, never more than one.
const DOMAIN_PREFIXES: [&str; 3] = ["e.", "email.", "mail."];

/// Words per minute assumed by the reading-time estimate.
const READING_WPM: usize = 200;

/// Parses a `From:` header into a [`Contact`].
///
/// Accepts the `Display Name <email@domain>` form, trimming whitespace and
/// one layer of surrounding double-quotes from the name and lowercasing the
/// email. A header without that shape reads verbatim as both name and
/// email, with no icon.
pub fn parse_sender(from: &str, allowlist: &Allowlist) -> Contact {
    match split_display_form(from) {
        Some((raw_name, raw_email)) => {
            let name = trim_quotes(raw_name.trim());
            let email = raw_email.to_lowercase();
            let photo_url = resolve_icon(name, &email, allowlist);
            Contact::new(name, email, photo_url)
        }
        None => Contact::new(from, from, ""),
    }
}

/// Splits `Name <email>` at the last `" <"` before the last `>`.
fn split_display_form(from: &str) -> Option<(&str, &str)> {
    let end = from.rfind('>')?;
    let start = from[..end].rfind(" <")?;
    Some((&from[..start], &from[start + 2..end]))
}

/// Strips at most one leading and one trailing double-quote.
fn trim_quotes(name: &str) -> &str {
    let name = name.strip_prefix('"').unwrap_or(name);
    name.strip_suffix('"').unwrap_or(name)
}

/// Resolves the icon URL for a sender.
///
/// An allowlist entry with an explicit asset path wins. Otherwise the icon
/// is a 64x64 favicon-service URL keyed by the sending domain, with one
/// mailing-infrastructure prefix stripped so `email.stratechery.com` and
/// `stratechery.com` share an icon. Always returns a non-empty string.
pub fn resolve_icon(name: &str, email: &str, allowlist: &Allowlist) -> String {
    if let Some(asset) = allowlist.icon_override(name) {
        return asset.to_string();
    }

    let mut domain = domain_of(email);
    for prefix in DOMAIN_PREFIXES {
        if let Some(stripped) = domain.strip_prefix(prefix) {
            domain = stripped;
            break;
        }
    }

    format!("{}?sz=64&domain_url={}", FAVICON_BASE, domain)
}

/// The part of an address after the first `@`, or the whole string when
/// there is no `@` at all.
fn domain_of(email: &str) -> &str {
    match email.find('@') {
        Some(at) => &email[at + 1..],
        None => email,
    }
}

/// Classifies a raw message.
///
/// Returns `None` for mail that is not a newsletter. An allowlist match
/// always wins over List-Unsubscribe presence.
pub fn classify(raw: &RawMessage, allowlist: &Allowlist) -> Option<Category> {
    let from = parse_sender(raw.header("From"), allowlist);
    category_for(&from, !raw.header("List-Unsubscribe").is_empty(), allowlist)
}

fn category_for(
    from: &Contact,
    has_unsubscribe: bool,
    allowlist: &Allowlist,
) -> Option<Category> {
    if allowlist.contains_name(&from.name) || allowlist.contains_domain(domain_of(&from.email)) {
        Some(Category::Important)
    } else if has_unsubscribe {
        Some(Category::Other)
    } else {
        None
    }
}

/// Decodes HTML entities in a snippet and marks truncation.
///
/// Snippets are previews cut mid-sentence; anything not already ending in
/// a period gets an ellipsis. Empty input stays empty.
pub fn clean_snippet(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut snippet = html_escape::decode_html_entities(raw).into_owned();
    if !snippet.ends_with('.') {
        snippet.push_str("...");
    }
    snippet
}

/// Estimates reading time in whole minutes from an HTML body.
///
/// Counts visible words (tags plus style and script content excluded) at
/// 200 words per minute, rounding up. An empty body reads as zero minutes.
pub fn reading_time(html: &str) -> u32 {
    let words = visible_text(html).split_whitespace().count();
    if words == 0 {
        0
    } else {
        words.div_ceil(READING_WPM) as u32
    }
}

/// Strips tags from an HTML fragment, dropping style and script content.
fn visible_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len() / 2);
    let mut tag: Option<String> = None;
    let mut skipping: Option<&'static str> = None;

    for c in html.chars() {
        match tag.as_mut() {
            Some(buf) => {
                if c == '>' {
                    let name = tag_name(buf);
                    match skipping {
                        None if name == "style" => skipping = Some("/style"),
                        None if name == "script" => skipping = Some("/script"),
                        Some(close) if name == close => skipping = None,
                        _ => {}
                    }
                    tag = None;
                    text.push(' ');
                } else {
                    buf.push(c);
                }
            }
            None if c == '<' => tag = Some(String::new()),
            None if skipping.is_none() => text.push(c),
            None => {}
        }
    }

    text
}

fn tag_name(tag: &str) -> String {
    tag.trim_start()
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Converts a raw provider message into a classified domain [`Message`].
///
/// Total over malformed input: missing headers, an unparseable date, or a
/// garbled body all degrade to empty or zero values.
pub fn message_from_raw(raw: &RawMessage, allowlist: &Allowlist) -> Message {
    let from = parse_sender(raw.header("From"), allowlist);
    let category = category_for(&from, !raw.header("List-Unsubscribe").is_empty(), allowlist);
    let body = raw.payload.as_ref().map(extract_body).unwrap_or_default();
    let time = reading_time(&body);

    Message {
        id: MessageId::from(raw.id.clone().unwrap_or_default()),
        date: message_date(raw),
        from,
        subject: raw.header("Subject").to_string(),
        snippet: clean_snippet(raw.snippet.as_deref().unwrap_or("")),
        body,
        time,
        category,
        archived: false,
        resume: false,
    }
}

/// Parses the provider's epoch-milliseconds timestamp, defaulting to the
/// Unix epoch when missing or unparseable.
fn message_date(raw: &RawMessage) -> DateTime<Utc> {
    raw.internal_date
        .as_deref()
        .and_then(|ms| ms.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH)
}
