//! The message normalizer: raw message in, [`NormalizedRecord`] out.
//!
//! Pipeline: [`body::extract_body`] → [`clean::clean_text`] →
//! [`links::shorten_links`], then [`save_attachments`] as a side effect.
//! Everything before the attachment step is a pure function of the message.

pub mod body;
pub mod clean;
pub mod links;

use tracing::debug;

use crate::error::Result;
use crate::model::message::RawMessage;
use crate::model::record::NormalizedRecord;
use crate::store::attachments::{save_attachments, AttachmentErrorPolicy, AttachmentStore};

/// Extracted, cleaned and link-shortened body text.
pub fn normalize_body(msg: &RawMessage) -> String {
    let raw = body::extract_body(msg);
    let cleaned = clean::clean_text(&raw);
    links::shorten_links(&cleaned)
}

/// Normalize one message and persist its attachments.
///
/// Only fails when an attachment write fails under
/// [`AttachmentErrorPolicy::DropMessage`].
pub fn normalize_message(
    msg: &RawMessage,
    message_id: &str,
    store: &mut dyn AttachmentStore,
    policy: AttachmentErrorPolicy,
) -> Result<NormalizedRecord> {
    let body = normalize_body(msg);
    let attachments = save_attachments(msg, message_id, store, policy)?;
    debug!(id = message_id, body_len = body.len(), "Normalized message");

    let headers = &msg.headers;
    Ok(NormalizedRecord {
        from: headers.from.clone().unwrap_or_default(),
        to: headers.to.clone().unwrap_or_default(),
        subject: headers.subject.clone().unwrap_or_default(),
        date: headers.date.clone().unwrap_or_default(),
        body,
        attachments,
    })
}
