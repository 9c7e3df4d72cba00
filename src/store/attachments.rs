//! Save attachment payloads under `<message-id>_<filename>`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InboxError, Result};
use crate::model::message::RawMessage;

/// Destination for attachment bytes, addressed by storage key.
pub trait AttachmentStore {
    /// Persist `bytes` under `key`, replacing anything already stored there.
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// What to do when an attachment cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentErrorPolicy {
    /// Log a warning, skip that attachment and keep going.
    #[default]
    Skip,
    /// Leave the whole message out of the output; the run continues.
    DropMessage,
}

/// Stores each attachment as a file in one directory.
#[derive(Debug)]
pub struct DirectoryStore {
    dir: PathBuf,
    files_written: usize,
    bytes_written: u64,
}

impl DirectoryStore {
    /// Use `dir` as the attachment directory, creating it if missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| InboxError::io(&dir, e))?;
        Ok(Self {
            dir,
            files_written: 0,
            bytes_written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `key` lands on disk.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl AttachmentStore for DirectoryStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        std::fs::write(&path, bytes).map_err(|source| InboxError::AttachmentWrite {
            key: key.to_string(),
            source,
        })?;
        self.files_written += 1;
        self.bytes_written += bytes.len() as u64;
        debug!(path = %path.display(), size = bytes.len(), "Saved attachment");
        Ok(())
    }
}

/// Keeps attachments in memory. Useful for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub files: BTreeMap<String, Vec<u8>>,
}

impl AttachmentStore for MemoryStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.files.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Storage key for an attachment: `<id>_<filename>`.
///
/// Path separators and NUL in the filename become `_` so the key stays a
/// single path component.
pub fn storage_key(message_id: &str, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{message_id}_{safe}")
}

/// Persist every named attachment of `msg`.
///
/// A part qualifies when it is a leaf, carries any disposition tag and has a
/// filename. Always returns an empty list: attachments are stored, not linked
/// into the record. Under [`AttachmentErrorPolicy::DropMessage`] the first
/// failed write is returned as the error.
pub fn save_attachments(
    msg: &RawMessage,
    message_id: &str,
    store: &mut dyn AttachmentStore,
    policy: AttachmentErrorPolicy,
) -> Result<Vec<String>> {
    for part in msg.walk() {
        if part.is_multipart() || part.disposition.is_none() {
            continue;
        }
        let Some(filename) = part.filename.as_deref().filter(|f| !f.is_empty()) else {
            continue;
        };
        let key = storage_key(message_id, filename);
        let payload = part.payload().unwrap_or_default();

        if let Err(e) = store.put(&key, payload) {
            match policy {
                AttachmentErrorPolicy::Skip => {
                    warn!(key = %key, error = %e, "Failed to save attachment, skipping");
                }
                AttachmentErrorPolicy::DropMessage => return Err(e),
            }
        }
    }

    Ok(Vec::new())
}
