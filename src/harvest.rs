//! Orchestration: fetch every message, normalize it, collect the records.
//!
//! Processing is strictly sequential. Per-message problems are logged and the
//! message is skipped; only mailbox-level failures end the run.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::model::record::NormalizedRecord;
use crate::normalize::normalize_message;
use crate::parser::mime;
use crate::store::attachments::{AttachmentErrorPolicy, AttachmentStore};

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct HarvestSummary {
    /// One record per successfully normalized message, in mailbox order.
    pub records: Vec<NormalizedRecord>,
    /// Messages the mailbox listed.
    pub listed: usize,
    /// Messages skipped because no body came back or it could not be parsed.
    pub skipped: usize,
    /// Messages dropped by [`AttachmentErrorPolicy::DropMessage`].
    pub dropped: usize,
}

/// Run the full pipeline over every message in `mailbox`.
///
/// `progress` receives `(current, total)`. The mailbox is logged out at the
/// end; a logout failure is only logged.
pub fn run(
    mailbox: &mut dyn Mailbox,
    store: &mut dyn AttachmentStore,
    policy: AttachmentErrorPolicy,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Result<HarvestSummary> {
    let ids = mailbox.message_ids()?;
    let total = ids.len();
    info!(total, "Listed messages");

    let mut summary = HarvestSummary {
        records: Vec::with_capacity(total),
        listed: total,
        ..HarvestSummary::default()
    };

    for (i, id) in ids.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i, total);
        }

        let Some(raw) = mailbox.fetch(id)? else {
            warn!(id = %id, "No message body returned, skipping");
            summary.skipped += 1;
            continue;
        };

        let msg = match mime::parse_message(&raw, id) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping unparseable message");
                summary.skipped += 1;
                continue;
            }
        };

        match normalize_message(&msg, id, store, policy) {
            Ok(record) => summary.records.push(record),
            Err(e) => {
                warn!(id = %id, error = %e, "Dropping message after attachment failure");
                summary.dropped += 1;
            }
        }
        debug!(id = %id, "Processed message");
    }

    if let Some(cb) = progress {
        cb(total, total);
    }

    if let Err(e) = mailbox.logout() {
        warn!(error = %e, "Logout failed");
    }

    info!(
        records = summary.records.len(),
        skipped = summary.skipped,
        dropped = summary.dropped,
        "Harvest finished"
    );
    Ok(summary)
}
