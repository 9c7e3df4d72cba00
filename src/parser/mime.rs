//! MIME parsing: raw RFC 5322 bytes into a [`RawMessage`] tree.

use mail_parser::{Address, HeaderName, Message, MessageParser, MimeHeaders, PartType};
use tracing::{debug, warn};

use crate::error::{InboxError, Result};
use crate::model::address::{render_list, EmailAddress};
use crate::model::message::{MessageHeaders, MessagePart, PartBody, RawMessage};

/// Maximum depth for recursive multipart and embedded-message descent.
const MAX_DEPTH: usize = 10;

/// Parse a complete raw message (headers + body) into a [`RawMessage`].
///
/// `id` is only used for error reporting. Uses `mail-parser` internally; part
/// payloads come out transfer-decoded (base64 / quoted-printable resolved) and
/// text parts are already converted to UTF-8.
pub fn parse_message(raw_message: &[u8], id: &str) -> Result<RawMessage> {
    let message_bytes = skip_from_line(raw_message);

    let parsed = MessageParser::default()
        .parse(message_bytes)
        .ok_or_else(|| InboxError::MimeParse { id: id.to_string() })?;

    let headers = extract_headers(&parsed);
    let root = match parsed.parts.first() {
        Some(_) => build_part(&parsed, 0, 0),
        None => {
            debug!(id, "Message has no parts, treating body as empty");
            MessagePart::leaf("text/plain", Vec::new())
        }
    };

    Ok(RawMessage::new(headers, root))
}

fn extract_headers(msg: &Message<'_>) -> MessageHeaders {
    MessageHeaders {
        from: address_header(msg.from(), msg.header_raw(HeaderName::From)),
        to: address_header(msg.to(), msg.header_raw(HeaderName::To)),
        subject: msg
            .subject()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        date: msg
            .header_raw(HeaderName::Date)
            .map(unfold)
            .filter(|s| !s.is_empty()),
    }
}

/// Render an address header, falling back to a lenient parse of the raw
/// value when `mail-parser` could not structure it.
fn address_header(parsed: Option<&Address<'_>>, raw: Option<&str>) -> Option<String> {
    let mut addresses = parsed.map(EmailAddress::from_address).unwrap_or_default();
    if addresses.is_empty() {
        if let Some(raw) = raw {
            addresses = EmailAddress::parse_list(&unfold(raw));
        }
    }

    let rendered = render_list(&addresses);
    (!rendered.is_empty()).then_some(rendered)
}

/// Join folded header lines and trim.
fn unfold(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn build_part(msg: &Message<'_>, index: usize, depth: usize) -> MessagePart {
    let Some(part) = msg.parts.get(index) else {
        return MessagePart::leaf("text/plain", Vec::new());
    };

    let content_type = part
        .content_type()
        .map(|ct| {
            let main = ct.ctype().to_ascii_lowercase();
            match ct.subtype() {
                Some(sub) => format!("{main}/{}", sub.to_ascii_lowercase()),
                None => main,
            }
        })
        .unwrap_or_else(|| match &part.body {
            PartType::Html(_) => "text/html".to_string(),
            PartType::Multipart(_) => "multipart/mixed".to_string(),
            PartType::Message(_) => "message/rfc822".to_string(),
            _ => "text/plain".to_string(),
        });

    let disposition = part
        .content_disposition()
        .map(|d| d.ctype().to_ascii_lowercase());

    let filename = part.attachment_name().map(str::to_string);

    let body = match &part.body {
        PartType::Multipart(children) if depth < MAX_DEPTH => PartBody::Multipart(
            children
                .iter()
                .map(|&child| build_part(msg, child as usize, depth + 1))
                .collect(),
        ),
        PartType::Message(nested) if depth < MAX_DEPTH => {
            PartBody::Multipart(vec![build_part(nested, 0, depth + 1)])
        }
        PartType::Multipart(_) | PartType::Message(_) => {
            warn!(depth, "Multipart nesting too deep, truncating");
            PartBody::Multipart(Vec::new())
        }
        _ => PartBody::Leaf(part.contents().to_vec()),
    };

    MessagePart {
        content_type,
        disposition,
        filename,
        body,
    }
}

/// Skip the `From ` separator line left at the start of MBOX-exported messages.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
