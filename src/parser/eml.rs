//! Loader for individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use crate::error::{InboxError, Result};
use crate::model::message::RawMessage;
use crate::parser::mime;

/// Read a `.eml` file and return its raw bytes.
pub fn read_eml(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            InboxError::FileNotFound(path.to_path_buf())
        } else {
            InboxError::io(path, e)
        }
    })
}

/// Read and parse a single `.eml` file.
///
/// The file stem doubles as the message identifier in error reports.
pub fn parse_eml(path: impl AsRef<Path>) -> Result<RawMessage> {
    let path = path.as_ref();
    let data = read_eml(path)?;
    mime::parse_message(&data, &message_id_for(path))
}

/// Identifier for a message stored at `path`: its file stem.
pub fn message_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "message".to_string())
}
