//! Shared configuration for the EXACT client library and its CLI.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file named with `--config-path`, then `EXACT_*` environment
//! variables, then command-line flags.

mod defaults;
mod endpoint;
mod logging;
mod tls;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_MAX_FRAME_BYTES, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, default_log_filter, default_log_filter_string, default_log_format,
    default_server_endpoint,
};
pub use endpoint::{EndpointParseError, ServerEndpoint};
pub use logging::{LogFormat, LogFormatParseError};
pub use tls::{TlsVerification, TlsVerificationParseError};

/// Connection, trust and logging settings for an EXACT client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "EXACT")]
pub struct Config {
    /// Server endpoint, `tls://HOST:PORT` or `tcp://HOST:PORT`.
    #[ortho_config(default = defaults::default_server_endpoint())]
    pub server: ServerEndpoint,
    /// Certificate trust policy for TLS endpoints.
    #[ortho_config(default = TlsVerification::Verify)]
    pub tls_verification: TlsVerification,
    /// PEM bundle of trust anchors used when verifying the server.
    pub ca_cert_path: Option<Utf8PathBuf>,
    /// Name presented for SNI and certificate matching; defaults to the host.
    pub server_name: Option<String>,
    /// Milliseconds allowed for the TCP connect.
    #[ortho_config(default = defaults::DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
    /// Milliseconds a blocking read may wait; unset blocks indefinitely.
    pub read_timeout_ms: Option<u64>,
    /// Largest accepted protocol message in bytes.
    #[ortho_config(default = defaults::DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: usize,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server_endpoint(),
            tls_verification: TlsVerification::default(),
            ca_cert_path: None,
            server_name: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: None,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Configured server endpoint.
    #[must_use]
    pub fn server(&self) -> &ServerEndpoint {
        &self.server
    }

    /// Certificate trust policy.
    #[must_use]
    pub fn tls_verification(&self) -> TlsVerification {
        self.tls_verification
    }

    /// CA bundle path, when one was configured.
    #[must_use]
    pub fn ca_cert_path(&self) -> Option<&Utf8Path> {
        self.ca_cert_path.as_deref()
    }

    /// Name used for SNI and certificate matching.
    #[must_use]
    pub fn server_name(&self) -> &str {
        self.server_name
            .as_deref()
            .unwrap_or_else(|| self.server.host())
    }

    /// Budget for establishing the TCP connection.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Socket read timeout, `None` when reads block indefinitely.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// Largest accepted protocol message in bytes.
    #[must_use]
    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_tls_server() {
        let config = Config::default();
        assert_eq!(config.server(), &ServerEndpoint::tls("127.0.0.1", 8000));
        assert_eq!(config.max_frame_bytes(), 4096);
        assert_eq!(config.read_timeout(), None);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn server_name_falls_back_to_host() {
        let mut config = Config::default();
        config.server = ServerEndpoint::tls("10.1.2.3", 8000);
        assert_eq!(config.server_name(), "10.1.2.3");
        config.server_name = Some(String::from("exl.example"));
        assert_eq!(config.server_name(), "exl.example");
    }
}
