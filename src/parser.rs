//! Internal module for extracting a plain-text body from a raw message.
//!
//! This is deliberately resilient: a message that cannot be parsed or decoded
//! degrades to an empty body (logged), never an error. The caller treats an
//! empty body the same as a body without a code.

use mailparse::{parse_mail, DispositionType, ParsedMail};
use tracing::warn;

/// Extracts the best-effort plain-text body from a raw RFC 822 message.
///
/// Multi-part messages yield the first `text/plain` part that is not an
/// attachment, walking nested parts depth-first. Single-part messages yield
/// their body only when the content type is `text/plain`. Decoding honors the
/// declared transfer encoding and charset, replacing invalid sequences.
pub(crate) fn plain_text_body(raw: &[u8]) -> String {
    let parsed = match parse_mail(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Failed to parse message, treating body as empty");
            return String::new();
        }
    };

    if parsed.subparts.is_empty() {
        if !is_plain_text(&parsed) {
            return String::new();
        }
        return decode_part(&parsed).unwrap_or_default();
    }

    first_plain_part(&parsed).unwrap_or_default()
}

/// Depth-first walk over subparts, returning the first decodable
/// `text/plain` part that is not an attachment.
fn first_plain_part(part: &ParsedMail<'_>) -> Option<String> {
    for sub in &part.subparts {
        if sub.subparts.is_empty() {
            if is_plain_text(sub) && !is_attachment(sub) {
                if let Some(text) = decode_part(sub) {
                    return Some(text);
                }
                // Undecodable part: logged in decode_part, keep walking
            }
        } else if let Some(text) = first_plain_part(sub) {
            return Some(text);
        }
    }
    None
}

fn is_plain_text(part: &ParsedMail<'_>) -> bool {
    part.ctype.mimetype.eq_ignore_ascii_case("text/plain")
}

fn is_attachment(part: &ParsedMail<'_>) -> bool {
    part.get_content_disposition().disposition == DispositionType::Attachment
}

fn decode_part(part: &ParsedMail<'_>) -> Option<String> {
    match part.get_body() {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(error = %e, "Failed to decode message part");
            None
        }
    }
}
