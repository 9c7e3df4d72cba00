//! IMAP over implicit TLS.

use std::net::TcpStream;

use native_tls::{TlsConnector, TlsStream};
use tracing::{debug, info};

use crate::config::ImapConfig;
use crate::error::{InboxError, Result};

use super::Mailbox;

type ImapSession = ::imap::Session<TlsStream<TcpStream>>;

/// A logged-in session with one folder selected.
pub struct ImapMailbox {
    session: ImapSession,
    search: String,
}

impl ImapMailbox {
    /// Connect, log in and select the configured folder.
    pub fn connect(config: &ImapConfig) -> Result<Self> {
        let connection_error = |reason: String| InboxError::Connection {
            host: config.host.clone(),
            port: config.port,
            reason,
        };

        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| connection_error(e.to_string()))?;

        let client = ::imap::connect(
            (config.host.as_str(), config.port),
            config.host.as_str(),
            &tls,
        )
        .map_err(|e| connection_error(e.to_string()))?;
        debug!(host = %config.host, port = config.port, "Connected to IMAP server");

        let mut session = client
            .login(&config.username, &config.password)
            .map_err(|(e, _client)| InboxError::Authentication {
                username: config.username.clone(),
                reason: e.to_string(),
            })?;

        let mailbox = session
            .select(&config.folder)
            .map_err(|e| InboxError::mailbox("SELECT", e))?;
        info!(
            folder = %config.folder,
            exists = mailbox.exists,
            "Selected IMAP folder"
        );

        Ok(Self {
            session,
            search: config.search.clone(),
        })
    }
}

impl Mailbox for ImapMailbox {
    fn message_ids(&mut self) -> Result<Vec<String>> {
        let mut sequence_numbers: Vec<u32> = self
            .session
            .search(&self.search)
            .map_err(|e| InboxError::mailbox("SEARCH", e))?
            .into_iter()
            .collect();
        sequence_numbers.sort_unstable();
        Ok(sequence_numbers.iter().map(u32::to_string).collect())
    }

    fn fetch(&mut self, id: &str) -> Result<Option<Vec<u8>>> {
        let fetches = self
            .session
            .fetch(id, "RFC822")
            .map_err(|e| InboxError::mailbox("FETCH", e))?;
        Ok(fetches.iter().find_map(|f| f.body()).map(<[u8]>::to_vec))
    }

    fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .map_err(|e| InboxError::mailbox("LOGOUT", e))
    }
}
