//! Write normalized records as a pretty-printed JSON array.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::model::record::NormalizedRecord;

/// Indentation used for the output file.
const INDENT: &[u8] = b"    ";

/// Serialize `records` into `writer` as an indented JSON array.
pub fn write_records<W: Write>(records: &[NormalizedRecord], writer: W) -> anyhow::Result<()> {
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut serializer)?;
    Ok(())
}

/// Render `records` to a string with the same formatting as [`export_json`].
pub fn records_to_string(records: &[NormalizedRecord]) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    write_records(records, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Write `records` to `path`, replacing any existing file.
pub fn export_json(records: &[NormalizedRecord], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records(records, &mut writer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    tracing::info!(path = %path.display(), count = records.len(), "Wrote JSON summary");
    Ok(())
}
