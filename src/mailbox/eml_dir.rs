//! A directory of `.eml` files treated as a mailbox.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{InboxError, Result};
use crate::parser::eml::{message_id_for, read_eml};

use super::Mailbox;

/// Every `*.eml` file directly inside a directory, ordered by file name.
///
/// The identifier of a message is its file stem, so `0042.eml` stores its
/// attachments as `0042_<filename>`.
#[derive(Debug)]
pub struct EmlDirectory {
    files: BTreeMap<String, PathBuf>,
}

impl EmlDirectory {
    /// Scan `dir` for `.eml` files. Subdirectories are not searched.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(InboxError::FileNotFound(dir));
        }

        let mut files = BTreeMap::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| InboxError::io(&dir, e))? {
            let path = entry.map_err(|e| InboxError::io(&dir, e))?.path();
            let is_eml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
            if is_eml && path.is_file() {
                files.insert(message_id_for(&path), path);
            }
        }
        debug!(dir = %dir.display(), count = files.len(), "Scanned EML directory");

        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Mailbox for EmlDirectory {
    fn message_ids(&mut self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    /// An unreadable file yields `None` so one bad file does not stop the run.
    fn fetch(&mut self, id: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.files.get(id) else {
            return Ok(None);
        };
        match read_eml(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read message file");
                Ok(None)
            }
        }
    }
}
