//! TLS client configuration for the two trust policies.
//!
//! `verify` validates the server chain against a PEM bundle of trust anchors.
//! `insecure` accepts whatever certificate the server presents, which is how
//! EXL deployments with self-signed certificates are reached; handshake
//! signatures are still checked so the session keys are bound to that
//! certificate.

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use exact_config::TlsVerification;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use thiserror::Error;
use tracing::warn;

/// Failures while assembling the TLS client configuration.
#[derive(Debug, Error)]
pub enum TlsConfigError {
    /// Verification was requested without trust anchors.
    #[error("TLS verification requires a CA bundle; set ca_cert_path or choose insecure verification")]
    MissingCaBundle,

    /// The CA bundle could not be read or held no usable certificates.
    #[error("failed to load CA bundle {path}: {source}")]
    CaBundle {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configured server name is not a valid DNS name or IP address.
    #[error("invalid TLS server name '{0}'")]
    InvalidServerName(String),

    /// rustls rejected the configuration.
    #[error("failed to build TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Builds the rustls client configuration for `policy`.
///
/// # Errors
///
/// Returns [`TlsConfigError`] when trust anchors are missing or unreadable.
pub fn client_config(
    policy: TlsVerification,
    ca_cert_path: Option<&Utf8Path>,
) -> Result<Arc<ClientConfig>, TlsConfigError> {
    let provider = crypto_provider();
    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?;
    let config = match policy {
        TlsVerification::Verify => {
            let path = ca_cert_path.ok_or(TlsConfigError::MissingCaBundle)?;
            let roots = load_root_store(path).map_err(|source| TlsConfigError::CaBundle {
                path: path.to_owned(),
                source,
            })?;
            builder.with_root_certificates(roots).with_no_client_auth()
        }
        TlsVerification::Insecure => {
            warn!(
                target: "exact_client::transport",
                "server certificate validation is disabled"
            );
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
                .with_no_client_auth()
        }
    };
    Ok(Arc::new(config))
}

/// Parses the name sent for SNI and used for certificate matching.
///
/// # Errors
///
/// Returns [`TlsConfigError::InvalidServerName`] for unusable names.
pub fn server_name(name: &str) -> Result<ServerName<'static>, TlsConfigError> {
    ServerName::try_from(name.to_owned())
        .map_err(|_| TlsConfigError::InvalidServerName(name.to_owned()))
}

fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .map(Arc::clone)
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn load_cert_chain(path: &Utf8Path) -> io::Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let certificates = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to parse PEM certs from {path}: {err}"),
            )
        })?;
    if certificates.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates found in {path}"),
        ));
    }
    Ok(certificates)
}

fn load_root_store(path: &Utf8Path) -> io::Result<RootCertStore> {
    let certificates = load_cert_chain(path)?;
    let mut roots = RootCertStore::empty();
    let (added, _ignored) = roots.add_parsable_certificates(certificates);
    if added == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no valid CA certificates found in {path}"),
        ));
    }
    Ok(roots)
}

/// Accepts any server certificate but still verifies handshake signatures.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn verify_without_bundle_is_rejected() {
        let error = client_config(TlsVerification::Verify, None).expect_err("missing bundle");
        assert!(matches!(error, TlsConfigError::MissingCaBundle));
    }

    #[test]
    fn insecure_policy_builds_without_bundle() {
        assert!(client_config(TlsVerification::Insecure, None).is_ok());
    }

    #[test]
    fn bundle_without_certificates_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "not a certificate").expect("write");
        let path = Utf8Path::from_path(file.path()).expect("utf8 path");
        let error = client_config(TlsVerification::Verify, Some(path)).expect_err("empty bundle");
        assert!(matches!(error, TlsConfigError::CaBundle { .. }));
    }

    #[test]
    fn server_names_accept_hosts_and_addresses() {
        assert!(server_name("exl.example").is_ok());
        assert!(server_name("10.0.0.1").is_ok());
        assert!(matches!(
            server_name("not a host"),
            Err(TlsConfigError::InvalidServerName(_))
        ));
    }
}
