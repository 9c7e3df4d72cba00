//! Body extraction: pick the text/plain or text/html part and turn it into text.

use tracing::debug;

use crate::error::DecodeError;
use crate::model::message::{MessagePart, PartKind, RawMessage};

/// Extract the unprocessed body text of a message.
///
/// Multipart messages are walked depth-first. Parts tagged `attachment` are
/// skipped, and the first usable `text/plain` and `text/html` parts become
/// candidates. Plain text wins when non-empty, then HTML, then `""`.
///
/// Never fails: a part that cannot be decoded is treated as absent.
pub fn extract_body(msg: &RawMessage) -> String {
    if !msg.is_multipart() {
        let kind = match msg.root.kind() {
            PartKind::Html => PartKind::Html,
            _ => PartKind::PlainText,
        };
        return part_text(&msg.root, kind).unwrap_or_else(|e| {
            debug!(error = %e, "Single-part body unusable");
            String::new()
        });
    }

    let mut plain: Option<String> = None;
    let mut html: Option<String> = None;

    for part in msg.walk() {
        if part.is_multipart() || part.is_attachment() {
            continue;
        }
        let kind = part.kind();
        let slot = match kind {
            PartKind::PlainText => &mut plain,
            PartKind::Html => &mut html,
            PartKind::Other => continue,
        };
        if slot.is_some() {
            continue;
        }
        match part_text(part, kind) {
            Ok(text) => *slot = Some(text),
            Err(e) => debug!(
                content_type = %part.content_type,
                error = %e,
                "Skipping body candidate"
            ),
        }
    }

    plain
        .filter(|text| !text.is_empty())
        .or(html)
        .unwrap_or_default()
}

/// Decode one part's payload and convert it according to `kind`.
pub fn part_text(part: &MessagePart, kind: PartKind) -> Result<String, DecodeError> {
    let convert =
        strategy(kind).ok_or_else(|| DecodeError::NotText(part.content_type.clone()))?;
    let payload = part
        .payload()
        .filter(|bytes| !bytes.is_empty())
        .ok_or(DecodeError::EmptyPayload)?;
    Ok(convert(&decode_utf8_ignore(payload)))
}

/// How each kind of part becomes text. `Other` parts carry no body text.
fn strategy(kind: PartKind) -> Option<fn(&str) -> String> {
    match kind {
        PartKind::PlainText => Some(verbatim),
        PartKind::Html => Some(html_to_text),
        PartKind::Other => None,
    }
}

fn verbatim(text: &str) -> String {
    text.to_string()
}

/// Decode bytes as UTF-8, dropping invalid sequences instead of replacing them.
pub fn decode_utf8_ignore(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Extract the text content of an HTML document.
///
/// Each run of text between tags becomes one line, so `<p>Visit<br>us</p>`
/// yields `"Visit\nus"`. Script and style contents, comments, doctypes and
/// processing instructions are dropped. Common entities are decoded.
pub fn html_to_text(html: &str) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        current.push_str(&rest[..lt]);
        let after = &rest[lt..];

        if let Some(comment) = after.strip_prefix("<!--") {
            flush_run(&mut runs, &mut current);
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        if !looks_like_tag(&after[1..]) {
            current.push('<');
            rest = &after[1..];
            continue;
        }

        let Some(gt) = tag_end(after) else {
            current.push_str(after);
            rest = "";
            break;
        };

        let inner = &after[1..gt];

        flush_run(&mut runs, &mut current);
        rest = &after[gt + 1..];

        let name = tag_name(inner);
        if !inner.starts_with('/') && (name == "script" || name == "style") {
            let close = format!("</{name}");
            rest = rest
                .to_ascii_lowercase()
                .find(&close)
                .map_or("", |pos| &rest[pos..]);
        }
    }

    current.push_str(rest);
    flush_run(&mut runs, &mut current);

    runs.join("\n")
}

fn flush_run(runs: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        runs.push(decode_entities(current));
        current.clear();
    }
}

/// Byte offset of the `>` closing the tag at the start of `tag`.
///
/// A `>` inside a quoted attribute value (`="..."` or `='...'`) does not close
/// the tag. If a quote is never closed, the first `>` wins.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut after_equals = false;
    for (i, b) in tag.bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' if after_equals => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            after_equals = quote.is_none() && b == b'=';
        }
    }
    tag.find('>')
}

/// `<p`, `</p`, `<!DOCTYPE`, `<?xml` are tags; `< 3` or `<=` are text.
fn looks_like_tag(inner: &str) -> bool {
    let mut chars = inner.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => true,
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        Some('!') | Some('?') => true,
        _ => false,
    }
}

fn tag_name(inner: &str) -> String {
    inner
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Decode named and numeric character references. Unknown ones are kept as-is.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .bytes()
            .take(12)
            .position(|b| b == b';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity_char(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
