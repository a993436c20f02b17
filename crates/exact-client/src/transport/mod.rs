//! Connection ownership and line-oriented I/O.
//!
//! A [`Transport`] holds at most one connection to the configured endpoint.
//! `tls://` endpoints are wrapped in a rustls session whose handshake finishes
//! inside [`Transport::connect`]; `tcp://` endpoints speak the same framing in
//! plaintext for local harnesses.

mod frame;
mod tls;
#[cfg(test)]
mod tls_tests;

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use camino::Utf8PathBuf;
use exact_config::{Config, ServerEndpoint, TlsVerification};
use rustls::{ClientConnection, StreamOwned};
use tracing::{debug, info};

use crate::codec::{self, Record};
use crate::errors::ClientError;

pub use frame::FrameReader;
pub use tls::{TlsConfigError, client_config, server_name};

/// Connection parameters taken from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    pub endpoint: ServerEndpoint,
    pub tls_verification: TlsVerification,
    pub ca_cert_path: Option<Utf8PathBuf>,
    pub server_name: String,
    pub connect_timeout: Duration,
    pub read_timeout: Option<Duration>,
    pub max_frame_bytes: usize,
}

impl From<&Config> for TransportSettings {
    fn from(config: &Config) -> Self {
        Self {
            endpoint: config.server().clone(),
            tls_verification: config.tls_verification(),
            ca_cert_path: config.ca_cert_path().map(ToOwned::to_owned),
            server_name: config.server_name().to_owned(),
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            max_frame_bytes: config.max_frame_bytes(),
        }
    }
}

enum Connection {
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
    Plain(TcpStream),
}

impl Connection {
    fn socket(&self) -> &TcpStream {
        match self {
            Self::Tls(stream) => &stream.sock,
            Self::Plain(stream) => stream,
        }
    }

    fn shutdown(self) {
        match self {
            Self::Tls(mut stream) => {
                stream.conn.send_close_notify();
                if let Err(error) = stream.conn.complete_io(&mut stream.sock) {
                    debug!(target: "exact_client::transport", %error, "close_notify not delivered");
                }
                let _ = stream.sock.shutdown(Shutdown::Both);
            }
            Self::Plain(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.read(buf),
            Self::Plain(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.write(buf),
            Self::Plain(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tls(stream) => stream.flush(),
            Self::Plain(stream) => stream.flush(),
        }
    }
}

/// Owner of the single connection to the server.
pub struct Transport {
    settings: TransportSettings,
    connection: Option<Connection>,
    frames: FrameReader,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("endpoint", &self.settings.endpoint)
            .field("connected", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Transport {
    #[must_use]
    pub fn new(settings: TransportSettings) -> Self {
        let frames = FrameReader::new(settings.max_frame_bytes);
        Self {
            settings,
            connection: None,
            frames,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens the connection, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] of kind
    /// [`Connection`](crate::ErrorKind::Connection) when the host does not
    /// resolve, the TCP connect fails, or the TLS handshake fails.
    pub fn connect(&mut self) -> Result<(), ClientError> {
        self.close();
        let endpoint = self.settings.endpoint.to_string();
        let socket = self.open_socket(&endpoint)?;
        socket
            .set_nodelay(true)
            .map_err(|source| ClientError::connect(&endpoint, source))?;

        let connection = if self.settings.endpoint.uses_tls() {
            Connection::Tls(Box::new(self.handshake(&endpoint, socket)?))
        } else {
            Connection::Plain(socket)
        };
        connection
            .socket()
            .set_read_timeout(self.settings.read_timeout)
            .map_err(|source| ClientError::connect(&endpoint, source))?;

        self.connection = Some(connection);
        info!(target: "exact_client::transport", %endpoint, "connected");
        Ok(())
    }

    /// Closes the connection if one is open. Never fails.
    pub fn close(&mut self) {
        self.frames.clear();
        if let Some(connection) = self.connection.take() {
            connection.shutdown();
            info!(
                target: "exact_client::transport",
                endpoint = %self.settings.endpoint,
                "disconnected"
            );
        }
    }

    /// Writes one already-terminated line.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Send`] when no connection is open or the write
    /// fails.
    pub fn write_line(&mut self, line: &[u8]) -> Result<(), ClientError> {
        let connection = self.connection.as_mut().ok_or_else(not_connected_send)?;
        connection.write_all(line).map_err(ClientError::Send)?;
        connection.flush().map_err(ClientError::Send)
    }

    /// Blocks until one frame arrives and decodes it.
    ///
    /// # Errors
    ///
    /// Returns the framing errors of [`FrameReader::read_frame`] or a
    /// decode error for frames that are not JSON objects.
    pub fn read_record(&mut self) -> Result<Record, ClientError> {
        let connection = self.connection.as_mut().ok_or_else(|| {
            ClientError::Receive(io::Error::from(io::ErrorKind::NotConnected))
        })?;
        let frame = self.frames.read_frame(connection)?;
        debug!(
            target: "exact_client::codec",
            frame = %String::from_utf8_lossy(&frame),
            "received"
        );
        codec::decode(&frame)
    }

    /// Overrides the socket read timeout; `None` blocks indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Receive`] when the socket rejects the timeout.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), ClientError> {
        match &self.connection {
            Some(connection) => connection
                .socket()
                .set_read_timeout(timeout)
                .map_err(ClientError::Receive),
            None => Ok(()),
        }
    }

    /// Restores the configured read timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Receive`] when the socket rejects the timeout.
    pub fn reset_read_timeout(&mut self) -> Result<(), ClientError> {
        self.set_read_timeout(self.settings.read_timeout)
    }

    fn open_socket(&self, endpoint: &str) -> Result<TcpStream, ClientError> {
        let target = (self.settings.endpoint.host(), self.settings.endpoint.port());
        let addresses: Vec<SocketAddr> = target
            .to_socket_addrs()
            .map_err(|source| ClientError::Resolve {
                endpoint: endpoint.to_owned(),
                source,
            })?
            .collect();

        let mut last_error = None;
        for address in addresses {
            debug!(target: "exact_client::transport", %address, "connecting");
            match TcpStream::connect_timeout(&address, self.settings.connect_timeout) {
                Ok(socket) => return Ok(socket),
                Err(error) => last_error = Some(error),
            }
        }
        Err(match last_error {
            Some(source) => ClientError::connect(endpoint, source),
            None => ClientError::Resolve {
                endpoint: endpoint.to_owned(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses resolved"),
            },
        })
    }

    fn handshake(
        &self,
        endpoint: &str,
        mut socket: TcpStream,
    ) -> Result<StreamOwned<ClientConnection, TcpStream>, ClientError> {
        let config = client_config(
            self.settings.tls_verification,
            self.settings.ca_cert_path.as_deref(),
        )?;
        let name = server_name(&self.settings.server_name)?;
        let mut session = ClientConnection::new(config, name).map_err(TlsConfigError::from)?;

        let handshake_error = |source: io::Error| ClientError::Handshake {
            endpoint: endpoint.to_owned(),
            source,
        };
        socket
            .set_read_timeout(Some(self.settings.connect_timeout))
            .map_err(handshake_error)?;
        while session.is_handshaking() {
            session.complete_io(&mut socket).map_err(handshake_error)?;
        }
        debug!(
            target: "exact_client::transport",
            version = ?session.protocol_version(),
            "TLS handshake complete"
        );
        Ok(StreamOwned::new(session, socket))
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

fn not_connected_send() -> ClientError {
    ClientError::Send(io::Error::from(io::ErrorKind::NotConnected))
}
