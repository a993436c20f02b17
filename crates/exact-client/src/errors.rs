//! Error types surfaced by the EXACT client.
//!
//! Every failure carries enough context to name the endpoint or frame that
//! caused it. [`ClientError::kind`] folds the variants onto the coarse
//! taxonomy callers branch on.

use std::io;

use thiserror::Error;

use crate::message::ValidationError;
use crate::transport::TlsConfigError;

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Establishing the connection failed.
    Connection,
    /// The peer closed the stream while a frame was expected.
    ConnectionClosed,
    /// Writing to or reading from the socket failed.
    Io,
    /// A frame violated the framing rules (for example it was too large).
    Frame,
    /// A frame was not a JSON object, or a request could not be encoded.
    Decode,
    /// A caller-supplied payload violated a field constraint.
    Validation,
}

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connect to the server failed.
    #[error("failed to connect to {endpoint} (error number: {errno:?}): {source}")]
    Connect {
        endpoint: String,
        errno: Option<i32>,
        #[source]
        source: io::Error,
    },

    /// Host name did not resolve to a usable address.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// TLS session could not be set up or the handshake failed.
    #[error("TLS handshake with {endpoint} failed: {source}")]
    Handshake {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Trust anchors or TLS parameters were unusable.
    #[error(transparent)]
    TlsConfig(#[from] TlsConfigError),

    /// Peer closed the stream.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// Writing a request failed.
    #[error("failed to send request: {0}")]
    Send(#[source] io::Error),

    /// Reading a frame failed.
    #[error("failed to read from server: {0}")]
    Receive(#[source] io::Error),

    /// Frame exceeded the configured limit.
    #[error("frame too large: {size} bytes exceeds {max_size} byte limit")]
    FrameTooLarge { size: usize, max_size: usize },

    /// Inbound frame was not a JSON object.
    #[error("malformed frame: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Outbound request could not be serialised.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The notification worker thread could not be started.
    #[error("failed to start notification worker: {0}")]
    Spawn(#[source] io::Error),

    /// The notification worker thread panicked.
    #[error("notification worker panicked")]
    WorkerPanicked,

    /// Request payload failed validation before any I/O took place.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClientError {
    /// Maps the error onto its [`ErrorKind`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect { .. }
            | Self::Resolve { .. }
            | Self::Handshake { .. }
            | Self::TlsConfig(_) => ErrorKind::Connection,
            Self::ConnectionClosed => ErrorKind::ConnectionClosed,
            Self::Send(_) | Self::Receive(_) | Self::Spawn(_) | Self::WorkerPanicked => {
                ErrorKind::Io
            }
            Self::FrameTooLarge { .. } => ErrorKind::Frame,
            Self::Decode { .. } | Self::Encode(_) => ErrorKind::Decode,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Creates a connect error, keeping the OS error number when present.
    pub fn connect(endpoint: impl Into<String>, source: io::Error) -> Self {
        Self::Connect {
            endpoint: endpoint.into(),
            errno: source.raw_os_error(),
            source,
        }
    }

    /// Creates a decode error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Decode {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a decode error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` when a read gave up because the socket timed out.
    ///
    /// The notification loop uses this to poll its stop flag.
    #[must_use]
    pub fn is_read_timeout(&self) -> bool {
        matches!(
            self,
            Self::Receive(source)
                if matches!(source.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
        )
    }
}
