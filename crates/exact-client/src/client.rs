//! The EXACT client: one connection, one msgid counter, blocking exchanges.
//!
//! Without an open connection every exchange degrades to an empty [`Reply`]
//! and nothing is written. Validation runs first regardless, so a bad payload
//! fails the same way whether or not the client is connected.

use exact_config::Config;
use tracing::{debug, instrument};

use crate::aggregate::{self, Reply};
use crate::codec;
use crate::errors::ClientError;
use crate::message::Request;
use crate::sequencer::Sequencer;
use crate::transport::{Transport, TransportSettings};

/// Blocking client for an EXL server.
#[derive(Debug)]
pub struct ExactClient {
    pub(crate) transport: Transport,
    sequencer: Sequencer,
}

impl ExactClient {
    /// Creates a disconnected client.
    #[must_use]
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            transport: Transport::new(settings),
            sequencer: Sequencer::new(),
        }
    }

    /// Creates a disconnected client from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(TransportSettings::from(config))
    }

    /// Opens the connection, closing any existing one first.
    ///
    /// # Errors
    ///
    /// Returns a connection-kind [`ClientError`] when the server cannot be
    /// reached or the TLS handshake fails.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        self.transport.connect()
    }

    /// Closes the connection. Calling this while disconnected does nothing.
    pub fn disconnect(&mut self) {
        self.transport.close();
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    /// Identifier of the last request written, zero before the first.
    #[must_use]
    pub fn last_msgid(&self) -> u64 {
        self.sequencer.last()
    }

    /// Validates, stamps and writes `request` without reading a reply.
    ///
    /// Returns the msgid used, or `None` when no connection is open.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] before any I/O for invalid
    /// payloads, or the encode and send failures.
    pub fn send(&mut self, request: &Request) -> Result<Option<u64>, ClientError> {
        request.validate()?;
        if !self.transport.is_open() {
            debug!(
                target: "exact_client::client",
                request = request.kind(),
                "not connected; request not sent"
            );
            return Ok(None);
        }

        let msgid = self.sequencer.peek();
        let line = codec::encode(request, msgid)?;
        debug!(
            target: "exact_client::codec",
            frame = %String::from_utf8_lossy(line.trim_ascii_end()),
            "sending"
        );
        self.transport.write_line(&line)?;
        Ok(Some(self.sequencer.commit()))
    }

    /// Sends `request` and collects its reply in the request's fixed mode.
    ///
    /// # Errors
    ///
    /// Returns the failures of [`ExactClient::send`], then any read or
    /// decode failure while collecting. Server `error` responses are
    /// returned as ordinary replies.
    #[instrument(level = "debug", skip(self, request), fields(request = request.kind()))]
    pub fn exchange(&mut self, request: &Request) -> Result<Reply, ClientError> {
        let mode = request.mode();
        match self.send(request)? {
            Some(_) => aggregate::collect(&mut self.transport, mode),
            None => Ok(Reply::empty(mode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use exact_config::ServerEndpoint;

    use super::*;
    use crate::aggregate::AggregationMode;
    use crate::message::{Channel, ChannelSelection, ValidationError};

    fn offline_client() -> ExactClient {
        let mut config = Config::default();
        config.server = ServerEndpoint::tcp("127.0.0.1", 9);
        ExactClient::from_config(&config)
    }

    #[test]
    fn offline_exchange_is_empty() {
        let mut client = offline_client();
        let reply = client.exchange(&Request::ListTags).expect("degraded");
        assert_eq!(reply, Reply::empty(AggregationMode::Multi));
        assert_eq!(client.last_msgid(), 0);
    }

    #[test]
    fn validation_runs_before_connection_check() {
        let mut client = offline_client();
        let request = Request::LeaveChannel {
            channel: ChannelSelection::Many(Vec::new()),
        };
        let error = client.exchange(&request).expect_err("invalid");
        assert!(matches!(
            error,
            ClientError::Validation(ValidationError::NoChannels)
        ));
        let valid = Request::JoinChannel {
            channel: ChannelSelection::One(Channel::Tags),
        };
        assert_eq!(client.send(&valid).expect("degraded"), None);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut client = offline_client();
        client.disconnect();
        client.disconnect();
        assert!(!client.is_connected());
    }
}
