//! Email parsing: MIME tree construction and `.eml` file loading.

pub mod eml;
pub mod mime;
