//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$INBOXDUMP_CONFIG` (environment variable)
//! 2. `~/.config/inboxdump/config.toml` (Linux/macOS)
//!    `%APPDATA%\inboxdump\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::attachments::AttachmentErrorPolicy;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Mail server connection.
    pub imap: ImapConfig,
    /// Where results go.
    pub output: OutputConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// IMAP connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImapConfig {
    pub host: String,
    /// Implicit-TLS port (993 for most providers).
    pub port: u16,
    pub username: String,
    /// Prefer `$INBOXDUMP_PASSWORD` over storing this in the file.
    pub password: String,
    /// Mailbox to select.
    pub folder: String,
    /// IMAP SEARCH criteria.
    pub search: String,
}

/// Output locations and failure policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON summary file.
    pub json_path: PathBuf,
    /// Directory receiving `<id>_<filename>` attachment files.
    pub attachment_dir: PathBuf,
    /// What to do when an attachment cannot be written.
    pub on_attachment_error: AttachmentErrorPolicy,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            host: "imap.gmail.com".to_string(),
            port: 993,
            username: String::new(),
            password: String::new(),
            folder: "INBOX".to_string(),
            search: "ALL".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("emails.json"),
            attachment_dir: PathBuf::from("attachments"),
            on_attachment_error: AttachmentErrorPolicy::Skip,
        }
    }
}

impl std::fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("folder", &self.folder)
            .field("search", &self.search)
            .finish()
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(path)
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("INBOXDUMP_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("inboxdump").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inboxdump")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("inboxdump.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.imap.host, "imap.gmail.com");
        assert_eq!(cfg.imap.port, 993);
        assert_eq!(cfg.imap.folder, "INBOX");
        assert_eq!(cfg.imap.search, "ALL");
        assert_eq!(cfg.output.json_path, PathBuf::from("emails.json"));
        assert_eq!(cfg.output.on_attachment_error, AttachmentErrorPolicy::Skip);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.output.on_attachment_error = AttachmentErrorPolicy::DropMessage;
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(toml_str.contains("on_attachment_error = \"drop-message\""));
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.imap.port, cfg.imap.port);
        assert_eq!(
            parsed.output.on_attachment_error,
            AttachmentErrorPolicy::DropMessage
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[imap]
host = "mail.example.com"
username = "me@example.com"

[output]
attachment_dir = "/tmp/att"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.imap.host, "mail.example.com");
        assert_eq!(cfg.imap.username, "me@example.com");
        assert_eq!(cfg.output.attachment_dir, PathBuf::from("/tmp/att"));
        // Other fields use defaults
        assert_eq!(cfg.imap.port, 993);
        assert_eq!(cfg.output.json_path, PathBuf::from("emails.json"));
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut imap = ImapConfig::default();
        imap.password = "hunter2".into();
        let rendered = format!("{imap:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_log_file_path_uses_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/var/tmp/inboxdump"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/var/tmp/inboxdump/inboxdump.log")
        );
    }
}
