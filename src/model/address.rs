//! Rendering of `From:` / `To:` address lists into record strings.

use mail_parser::{Addr, Address};

/// A single mailbox: optional display name plus bare address.
///
/// # Examples
/// - `"Ana Ruiz <ana@example.com>"` → `display_name = "Ana Ruiz"`, `address = "ana@example.com"`
/// - `"ana@example.com"` → `display_name = ""`, `address = "ana@example.com"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    pub display_name: String,
    pub address: String,
}

impl EmailAddress {
    /// Convert a parsed `mail-parser` mailbox. Returns `None` if it has neither
    /// a name nor an address.
    pub fn from_addr(addr: &Addr<'_>) -> Option<Self> {
        let display_name = addr.name.as_deref().unwrap_or("").trim().to_string();
        let address = addr.address.as_deref().unwrap_or("").trim().to_string();
        if display_name.is_empty() && address.is_empty() {
            return None;
        }
        Some(Self {
            display_name,
            address,
        })
    }

    /// Flatten a parsed address header (list or group syntax).
    pub fn from_address(address: &Address<'_>) -> Vec<Self> {
        match address {
            Address::List(list) => list.iter().filter_map(Self::from_addr).collect(),
            Address::Group(groups) => groups
                .iter()
                .flat_map(|g| g.addresses.iter())
                .filter_map(Self::from_addr)
                .collect(),
        }
    }

    /// Best-effort parse of one raw mailbox, used when `mail-parser` could not
    /// make sense of the header.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                return Self {
                    display_name: strip_quotes(&trimmed[..open]),
                    address: trimmed[open + 1..close].trim().to_string(),
                };
            }
        }
        Self {
            display_name: String::new(),
            address: trimmed.to_string(),
        }
    }

    /// Split a raw header on commas that are outside quotes and angle brackets.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        let mut results = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut in_angle = false;

        for ch in raw.chars() {
            match ch {
                '"' => in_quotes = !in_quotes,
                '<' if !in_quotes => in_angle = true,
                '>' if !in_quotes => in_angle = false,
                ',' if !in_quotes && !in_angle => {
                    results.push(Self::parse(&current));
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        results.push(Self::parse(&current));

        results.retain(|a| !a.address.is_empty() || !a.display_name.is_empty());
        results
    }

    /// `"Display Name <address>"`, or just the address (or name) when one is missing.
    pub fn display(&self) -> String {
        match (self.display_name.is_empty(), self.address.is_empty()) {
            (true, _) => self.address.clone(),
            (false, true) => self.display_name.clone(),
            (false, false) => format!("{} <{}>", self.display_name, self.address),
        }
    }
}

/// Render a list as `"A <a@x>, b@y"`.
pub fn render_list(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(EmailAddress::display)
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
