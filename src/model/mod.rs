//! Core data model: the raw message tree, address rendering, and the output record.

pub mod address;
pub mod message;
pub mod record;
