//! The as-fetched message tree the normalizer reads.

/// Header fields the normalizer copies into a record.
///
/// Every field is optional; a missing or unparseable header is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageHeaders {
    /// Rendered `From:` address list.
    pub from: Option<String>,
    /// Rendered `To:` address list.
    pub to: Option<String>,
    /// Decoded subject line (RFC 2047 encoded-words resolved).
    pub subject: Option<String>,
    /// The `Date:` header value, unfolded and trimmed.
    pub date: Option<String>,
}

/// A complete message: headers plus the root of its part tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub headers: MessageHeaders,
    pub root: MessagePart,
}

/// One node of the MIME tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePart {
    /// Lowercase `type/subtype`, e.g. `"text/plain"`.
    pub content_type: String,
    /// Disposition tag (`"attachment"`, `"inline"`), if the part declares one.
    pub disposition: Option<String>,
    /// Filename from `Content-Disposition` or the `name` parameter.
    pub filename: Option<String>,
    pub body: PartBody,
}

/// Payload of a part: decoded bytes for a leaf, children for a container.
#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Leaf(Vec<u8>),
    Multipart(Vec<MessagePart>),
}

/// How a part's payload is turned into body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    PlainText,
    Html,
    Other,
}

impl PartKind {
    /// Classify a lowercase content type.
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type {
            "text/plain" => PartKind::PlainText,
            "text/html" => PartKind::Html,
            _ => PartKind::Other,
        }
    }
}

impl RawMessage {
    pub fn new(headers: MessageHeaders, root: MessagePart) -> Self {
        Self { headers, root }
    }

    /// `true` if the root part is a container.
    pub fn is_multipart(&self) -> bool {
        self.root.is_multipart()
    }

    /// All parts in depth-first pre-order, containers included.
    pub fn walk(&self) -> Vec<&MessagePart> {
        let mut out = Vec::new();
        self.root.collect_into(&mut out);
        out
    }
}

impl MessagePart {
    /// A leaf part with the given content type and decoded payload.
    pub fn leaf(content_type: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            disposition: None,
            filename: None,
            body: PartBody::Leaf(payload.into()),
        }
    }

    /// A `multipart/<subtype>` container.
    pub fn multipart(subtype: &str, children: Vec<MessagePart>) -> Self {
        Self {
            content_type: format!("multipart/{subtype}"),
            disposition: None,
            filename: None,
            body: PartBody::Multipart(children),
        }
    }

    pub fn with_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = Some(disposition.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn kind(&self) -> PartKind {
        PartKind::from_content_type(&self.content_type)
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, PartBody::Multipart(_))
    }

    /// `true` if the disposition tag is exactly `"attachment"`.
    pub fn is_attachment(&self) -> bool {
        self.disposition.as_deref() == Some("attachment")
    }

    /// Decoded payload bytes, or `None` for a container.
    pub fn payload(&self) -> Option<&[u8]> {
        match &self.body {
            PartBody::Leaf(bytes) => Some(bytes),
            PartBody::Multipart(_) => None,
        }
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a MessagePart>) {
        out.push(self);
        if let PartBody::Multipart(children) = &self.body {
            for child in children {
                child.collect_into(out);
            }
        }
    }
}
