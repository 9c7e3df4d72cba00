//! The normalized per-message output record.

use serde::{Deserialize, Serialize};

/// One entry of the output JSON array.
///
/// Field order here is the serialized field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    /// Cleaned, link-shortened body text.
    pub body: String,
    /// Attachment references. Always empty: attachments are stored on disk
    /// but not linked from the record.
    pub attachments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_order() {
        let record = NormalizedRecord {
            from: "a@b.com".into(),
            to: "c@d.com".into(),
            subject: "Hi".into(),
            date: "Mon, 1 Jan 2024 10:00:00 +0000".into(),
            body: "Hello".into(),
            attachments: Vec::new(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let from = json.find("\"from\"").unwrap();
        let to = json.find("\"to\"").unwrap();
        let subject = json.find("\"subject\"").unwrap();
        let date = json.find("\"date\"").unwrap();
        let body = json.find("\"body\"").unwrap();
        let attachments = json.find("\"attachments\"").unwrap();
        assert!(from < to && to < subject && subject < date);
        assert!(date < body && body < attachments);
    }
}
