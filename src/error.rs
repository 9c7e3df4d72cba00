//! Centralized error types for inboxdump.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the inboxdump library.
#[derive(Error, Debug)]
pub enum InboxError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file or directory does not exist.
    #[error("Not found: {0}")]
    FileNotFound(PathBuf),

    /// The TCP/TLS connection to the mail server could not be established.
    #[error("Could not connect to '{host}:{port}': {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    /// The server rejected the credentials.
    #[error("Login failed for '{username}': {reason}")]
    Authentication { username: String, reason: String },

    /// A mailbox command (SELECT, SEARCH, FETCH) failed.
    #[error("Mailbox command {command} failed: {reason}")]
    Mailbox {
        command: &'static str,
        reason: String,
    },

    /// The raw bytes could not be parsed as an RFC 5322 message.
    #[error("MIME parse error for message '{id}'")]
    MimeParse { id: String },

    /// Writing an attachment to the store failed.
    #[error("Could not store attachment '{key}': {source}")]
    AttachmentWrite {
        key: String,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, InboxError>`.
pub type Result<T> = std::result::Result<T, InboxError>;

impl InboxError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn mailbox(command: &'static str, reason: impl ToString) -> Self {
        Self::Mailbox {
            command,
            reason: reason.to_string(),
        }
    }
}

/// Failure of a single decoding stage inside the normalizer.
///
/// These never leave the normalizer: the pipeline driver turns each one into
/// a fallback value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The part carried no payload bytes.
    #[error("empty payload")]
    EmptyPayload,

    /// The part is neither text/plain nor text/html.
    #[error("content type '{0}' carries no body text")]
    NotText(String),

    /// Quoted-printable decoding rejected the input.
    #[error("quoted-printable decode failed: {0}")]
    QuotedPrintable(String),
}
