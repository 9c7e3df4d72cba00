//! `inboxdump`: download a mailbox, normalize every message, write JSON.
//!
//! This crate provides the core library: MIME parsing into a message tree,
//! the body/cleaning/link pipeline, attachment storage, mailbox sources and
//! the sequential harvest loop that ties them together.

pub mod config;
pub mod error;
pub mod export;
pub mod harvest;
pub mod mailbox;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod store;
