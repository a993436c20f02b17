use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Location of the EXL server and whether the stream is TLS wrapped.
///
/// The textual form is `tls://HOST:PORT` for production deployments and
/// `tcp://HOST:PORT` for plaintext harnesses such as local fakes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum ServerEndpoint {
    /// TLS-wrapped TCP stream.
    Tls { host: String, port: u16 },
    /// Plaintext TCP stream.
    Tcp { host: String, port: u16 },
}

impl ServerEndpoint {
    /// Builds a TLS endpoint.
    #[must_use]
    pub fn tls(host: impl Into<String>, port: u16) -> Self {
        Self::Tls {
            host: host.into(),
            port,
        }
    }

    /// Builds a plaintext TCP endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Host name or address of the server.
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Tls { host, .. } | Self::Tcp { host, .. } => host,
        }
    }

    /// TCP port of the server.
    #[must_use]
    pub fn port(&self) -> u16 {
        match self {
            Self::Tls { port, .. } | Self::Tcp { port, .. } => *port,
        }
    }

    /// Returns `true` when the stream must be wrapped in TLS.
    #[must_use]
    pub fn uses_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls { host, port } => write!(formatter, "tls://{host}:{port}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for ServerEndpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
        // IPv6 literals come back bracketed from `Url::host_str`.
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = url
            .port()
            .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
        match url.scheme() {
            "tls" => Ok(Self::tls(host, port)),
            "tcp" => Ok(Self::tcp(host, port)),
            other => Err(EndpointParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

impl TryFrom<String> for ServerEndpoint {
    type Error = EndpointParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerEndpoint> for String {
    fn from(endpoint: ServerEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Errors encountered while parsing a [`ServerEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was neither `tls` nor `tcp`.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    /// Host name was missing.
    #[error("missing host in '{0}'")]
    MissingHost(String),
    /// Port was missing from the address.
    #[error("missing port in '{0}'")]
    MissingPort(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
