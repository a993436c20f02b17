//! Trust policy for the TLS session with the EXL server.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the client decides whether to trust the server certificate.
///
/// EXL appliances usually ship self-signed certificates. Operators who cannot
/// distribute a CA bundle may opt into [`TlsVerification::Insecure`], which
/// skips chain validation while still checking the handshake signatures. The
/// default is [`TlsVerification::Verify`]; it requires `ca_cert_path`.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TlsVerification {
    /// Validate the certificate chain against the configured CA bundle.
    #[default]
    Verify,
    /// Accept any server certificate.
    Insecure,
}

/// Errors encountered while parsing a [`TlsVerification`] from text.
pub type TlsVerificationParseError = strum::ParseError;
