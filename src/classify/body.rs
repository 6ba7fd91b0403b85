//! Message body extraction.
//!
//! Gmail delivers newsletter HTML in a MIME tree whose shape varies by
//! sender: a bare `text/html` payload, a `multipart/alternative` with html
//! and plain children, or an outer multipart wrapping the alternative set
//! one level down. The search here is deliberately bounded to those three
//! shapes; anything nested deeper reads as an empty body.

use base64::prelude::*;

use crate::providers::gmail::MessagePart;

const MIME_HTML: &str = "text/html";
const MIME_PLAIN: &str = "text/plain";

/// Extracts the display body from a message payload tree.
///
/// Returns the decoded HTML (or plain text fallback), or an empty string
/// when no text part is found or the content fails to decode. Extraction
/// never errors: a malformed payload reads as an empty body.
pub fn extract_body(payload: &MessagePart) -> String {
    decode_body_data(find_body_data(payload))
}

fn find_body_data(payload: &MessagePart) -> &str {
    if mime_is(payload, MIME_HTML) {
        return part_data(payload);
    }

    let parts: &[MessagePart] = payload.parts.as_deref().unwrap_or(&[]);
    if let Some(part) = pick_text_part(parts) {
        return part_data(part);
    }

    // Some senders wrap the alternative set in an outer multipart; look one
    // level into the first child only.
    let Some(first) = parts.first() else {
        return "";
    };
    let nested: &[MessagePart] = first.parts.as_deref().unwrap_or(&[]);
    pick_text_part(nested).map(part_data).unwrap_or("")
}

/// Prefers an html part over a plain text part.
fn pick_text_part(parts: &[MessagePart]) -> Option<&MessagePart> {
    parts
        .iter()
        .find(|part| mime_is(part, MIME_HTML))
        .or_else(|| parts.iter().find(|part| mime_is(part, MIME_PLAIN)))
}

fn mime_is(part: &MessagePart, mime: &str) -> bool {
    part.mime_type.as_deref() == Some(mime)
}

fn part_data(part: &MessagePart) -> &str {
    part.body
        .as_ref()
        .and_then(|body| body.data.as_deref())
        .unwrap_or("")
}

/// Decodes base64url body data, tolerating padded input.
fn decode_body_data(data: &str) -> String {
    if data.is_empty() {
        return String::new();
    }

    match BASE64_URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::gmail::MessageBody;

    fn encoded(text: &str) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(text)
    }

    fn leaf(mime: &str, data: Option<String>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            body: Some(MessageBody {
                data,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn multipart(mime: &str, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            parts: Some(parts),
            ..Default::default()
        }
    }

    #[test]
    fn top_level_html_is_used_directly() {
        let payload = leaf(MIME_HTML, Some(encoded("<p>direct</p>")));
        assert_eq!(extract_body(&payload), "<p>direct</p>");
    }

    #[test]
    fn top_level_plain_text_is_not_a_body() {
        let payload = leaf(MIME_PLAIN, Some(encoded("plain only")));
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn html_child_beats_plain_child() {
        let payload = multipart(
            "multipart/alternative",
            vec![
                leaf(MIME_PLAIN, Some(encoded("plain"))),
                leaf(MIME_HTML, Some(encoded("<b>html</b>"))),
            ],
        );
        assert_eq!(extract_body(&payload), "<b>html</b>");
    }

    #[test]
    fn plain_child_is_the_fallback() {
        let payload = multipart(
            "multipart/alternative",
            vec![leaf(MIME_PLAIN, Some(encoded("plain body")))],
        );
        assert_eq!(extract_body(&payload), "plain body");
    }

    #[test]
    fn chosen_part_with_missing_data_reads_empty() {
        // The html part wins the selection even though it carries no data;
        // the plain sibling is not consulted afterwards.
        let payload = multipart(
            "multipart/alternative",
            vec![
                leaf(MIME_HTML, None),
                leaf(MIME_PLAIN, Some(encoded("plain"))),
            ],
        );
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn descends_one_level_into_first_child() {
        let inner = multipart(
            "multipart/alternative",
            vec![
                leaf(MIME_PLAIN, Some(encoded("plain"))),
                leaf(MIME_HTML, Some(encoded("<i>nested</i>"))),
            ],
        );
        let payload = multipart("multipart/mixed", vec![inner]);
        assert_eq!(extract_body(&payload), "<i>nested</i>");
    }

    #[test]
    fn does_not_descend_two_levels() {
        let innermost = multipart(
            "multipart/alternative",
            vec![leaf(MIME_HTML, Some(encoded("too deep")))],
        );
        let inner = multipart("multipart/mixed", vec![innermost]);
        let payload = multipart("multipart/mixed", vec![inner]);
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn no_parts_reads_empty() {
        let payload = MessagePart::default();
        assert_eq!(extract_body(&payload), "");

        let payload = multipart("multipart/mixed", vec![]);
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn decodes_url_safe_alphabet() {
        // "<b>hello</b>" encodes with '-' and '_' replacements present.
        let payload = leaf(MIME_HTML, Some("PGI-aGVsbG88L2I-".to_string()));
        assert_eq!(extract_body(&payload), "<b>hello</b>");
    }

    #[test]
    fn tolerates_padded_input() {
        let payload = leaf(MIME_HTML, Some("aGk=".to_string()));
        assert_eq!(extract_body(&payload), "hi");
    }

    #[test]
    fn invalid_base64_reads_empty() {
        let payload = leaf(MIME_HTML, Some("!!!not base64!!!".to_string()));
        assert_eq!(extract_body(&payload), "");
    }

    #[test]
    fn lossy_utf8_decoding() {
        let payload = leaf(MIME_HTML, Some(BASE64_URL_SAFE_NO_PAD.encode([0x68, 0x69, 0xFF])));
        assert_eq!(extract_body(&payload), "hi\u{FFFD}");
    }
}
