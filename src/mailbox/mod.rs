//! Message sources: an IMAP server or a local directory of `.eml` files.

pub mod eml_dir;
pub mod imap;

use crate::error::Result;

/// A source of raw RFC 5322 messages addressed by identifier.
pub trait Mailbox {
    /// Identifiers of every message to process, in processing order.
    fn message_ids(&mut self) -> Result<Vec<String>>;

    /// Raw bytes of one message, or `None` when the source returned no body
    /// for it.
    fn fetch(&mut self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Close the session. Sources without a session do nothing.
    fn logout(&mut self) -> Result<()> {
        Ok(())
    }
}
