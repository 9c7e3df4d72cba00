//! Link shortening: `https://host/path` becomes `[host](https://host/path)`.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Replace every HTTP(S) URL with a markdown-style reference labelled by its host.
///
/// A URL runs from the scheme to the next whitespace. Running this twice
/// wraps the URL inside the parentheses again.
pub fn shorten_links(text: &str) -> String {
    url_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let url = &caps[0];
            format!("[{}]({url})", url_host(url))
        })
        .into_owned()
}

fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"https?://\S+").expect("valid URL regex"))
}

/// Host component of a URL: the authority without userinfo or port.
///
/// IPv6 literals keep their brackets. Returns `""` for `https://` alone.
pub fn url_host(url: &str) -> &str {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    if host_port.starts_with('[') {
        return host_port
            .find(']')
            .map_or(host_port, |end| &host_port[..=end]);
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    }
}
