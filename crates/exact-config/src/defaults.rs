use crate::endpoint::ServerEndpoint;
use crate::logging::LogFormat;

/// Port the EXL server listens on in a factory installation.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Host used when no server address has been configured.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Largest single protocol message, newline excluded.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 4096;

/// Budget for establishing the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default server endpoint: TLS to the local host on the factory port.
pub fn default_server_endpoint() -> ServerEndpoint {
    ServerEndpoint::tls(DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT)
}
