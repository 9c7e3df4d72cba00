//! Attachment persistence.

pub mod attachments;
