//! Integration tests for parsing, normalization, attachment storage and local runs.

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::*;

use inboxdump::export::json;
use inboxdump::harvest;
use inboxdump::mailbox::eml_dir::EmlDirectory;
use inboxdump::model::record::NormalizedRecord;
use inboxdump::normalize::normalize_message;
use inboxdump::parser::eml::parse_eml;
use inboxdump::store::attachments::{AttachmentErrorPolicy, DirectoryStore, MemoryStore};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn normalize_fixture(name: &str) -> (NormalizedRecord, MemoryStore) {
    let msg = parse_eml(fixture(name)).unwrap();
    let mut store = MemoryStore::default();
    let record = normalize_message(&msg, "1", &mut store, AttachmentErrorPolicy::Skip).unwrap();
    (record, store)
}

// ─── Flat text/plain with a quoted-printable NBSP ───────────────────

#[test]
fn test_plain_message_end_to_end() {
    let (record, store) = normalize_fixture("plain.eml");
    assert_eq!(record.body, "Hello World");
    assert!(record.attachments.is_empty());
    assert_eq!(record.from, "Alice Example <alice@example.com>");
    assert_eq!(record.to, "Bob <bob@example.com>");
    assert_eq!(record.subject, "Plain greeting");
    assert_eq!(record.date, "Mon, 01 Jan 2024 10:00:00 +0000");
    assert!(store.files.is_empty());
}

// ─── multipart/alternative: plain beats html ────────────────────────

#[test]
fn test_plain_part_preferred_over_html() {
    let (record, _) = normalize_fixture("alternative.eml");
    assert_eq!(record.body, "Hello");
    assert_eq!(record.to, "bob@example.com, Carol <carol@example.com>");
}

// ─── HTML-only body: text extraction, cleaning, link shortening ─────

#[test]
fn test_html_only_message() {
    let (record, _) = normalize_fixture("html_only.eml");
    assert_eq!(
        record.body,
        "Visit us at [example.com](https://example.com/page)"
    );
    assert!(!record.body.contains("margin"));
}

// ─── Encoded headers, folded date, latin-1 body ─────────────────────

#[test]
fn test_encoded_headers_and_charset_body() {
    let (record, _) = normalize_fixture("encoded_headers.eml");
    assert_eq!(record.from, "Jos\u{e9} Garc\u{ed}a <jose@example.com>");
    assert_eq!(record.subject, "Caf\u{e9} con le\u{f1}a");
    assert_eq!(record.date, "Fri, 05 Jan 2024 07:15:00 +0100");
    assert_eq!(record.body, "Se or, the caf opens at 8.");
}

// ─── Attachment is stored, not linked, and skipped as body ──────────

#[test]
fn test_attachment_saved_under_message_id() {
    let msg = parse_eml(fixture("attachment.eml")).unwrap();
    let mut store = MemoryStore::default();
    let record = normalize_message(&msg, "42", &mut store, AttachmentErrorPolicy::Skip).unwrap();
    assert_eq!(record.body, "Report attached.");
    assert!(record.attachments.is_empty());
    assert_eq!(
        store.files.get("42_report.pdf").map(Vec::as_slice),
        Some(&b"%PDF-1.4 fake report"[..])
    );
}

// ─── Forwarded message: body and attachments come from inside it ────

#[test]
fn test_forwarded_message_is_descended_into() {
    let msg = parse_eml(fixture("forwarded.eml")).unwrap();
    let mut store = MemoryStore::default();
    let record = normalize_message(&msg, "9", &mut store, AttachmentErrorPolicy::Skip).unwrap();
    assert_eq!(record.body, "Lunch at noon?");
    assert_eq!(record.subject, "Fwd: Lunch");
    assert_eq!(record.from, "Dana <dana@example.com>");
    let menu = store.files.get("9_menu.txt").expect("nested attachment saved");
    assert!(menu.starts_with(b"Soup, salad"));
    assert_eq!(store.files.len(), 1);
}

// ─── Two messages with the same attachment name do not collide ──────

#[test]
fn test_local_run_keeps_attachments_apart() {
    let inbox = assert_fs::TempDir::new().unwrap();
    inbox
        .child("1.eml")
        .write_file(&fixture("attachment.eml"))
        .unwrap();
    inbox
        .child("2.eml")
        .write_file(&fixture("attachment.eml"))
        .unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    let mut mailbox = EmlDirectory::open(inbox.path()).unwrap();
    let mut store = DirectoryStore::create(out.child("attachments").path()).unwrap();
    let summary =
        harvest::run(&mut mailbox, &mut store, AttachmentErrorPolicy::Skip, None).unwrap();

    assert_eq!(summary.records.len(), 2);
    out.child("attachments/1_report.pdf")
        .assert(predicate::path::exists());
    out.child("attachments/2_report.pdf")
        .assert(predicate::path::exists());
    out.child("attachments/1_report.pdf")
        .assert("%PDF-1.4 fake report");
    assert_eq!(store.files_written(), 2);
}

// ─── Full local run written to JSON ─────────────────────────────────

#[test]
fn test_local_run_to_json_file() {
    let inbox = assert_fs::TempDir::new().unwrap();
    for name in ["plain.eml", "alternative.eml", "html_only.eml"] {
        inbox.child(name).write_file(&fixture(name)).unwrap();
    }
    inbox.child("broken.eml").write_binary(b"").unwrap();

    let out = assert_fs::TempDir::new().unwrap();
    let mut mailbox = EmlDirectory::open(inbox.path()).unwrap();
    let mut store = MemoryStore::default();
    let summary =
        harvest::run(&mut mailbox, &mut store, AttachmentErrorPolicy::Skip, None).unwrap();

    assert_eq!(summary.listed, 4);
    assert_eq!(summary.records.len() + summary.skipped, 4);

    let json_path = out.child("emails.json");
    json::export_json(&summary.records, json_path.path()).unwrap();
    json_path.assert(predicate::str::contains("\"subject\": \"Both flavours\""));

    let text = std::fs::read_to_string(json_path.path()).unwrap();
    let parsed: Vec<NormalizedRecord> = serde_json::from_str(&text).unwrap();
    let bodies: Vec<&str> = parsed.iter().map(|r| r.body.as_str()).collect();
    assert!(bodies.contains(&"Hello World"));
    assert!(bodies.contains(&"Hello"));
}

// ─── Cleaner invariant holds on every fixture body ──────────────────

#[test]
fn test_bodies_are_clean_ascii() {
    for name in [
        "plain.eml",
        "alternative.eml",
        "html_only.eml",
        "attachment.eml",
        "encoded_headers.eml",
        "forwarded.eml",
    ] {
        let (record, _) = normalize_fixture(name);
        assert!(
            record.body.chars().all(|c| (' '..='~').contains(&c)),
            "{name}: non-printable output {:?}",
            record.body
        );
        assert!(!record.body.contains("  "), "{name}: double space");
        assert_eq!(record.body.trim(), record.body, "{name}: untrimmed");
    }
}
