//! Handshake tests against an in-process rustls server.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use camino::Utf8PathBuf;
use exact_config::{Config, ServerEndpoint, TlsVerification};
use rcgen::{CertifiedKey, generate_simple_self_signed};
use rstest::{fixture, rstest};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use tempfile::TempDir;

use super::{Transport, TransportSettings};
use crate::ErrorKind;

/// Self-signed certificate for `localhost`.
struct Identity {
    certified: CertifiedKey,
}

impl Identity {
    fn generate() -> Self {
        let certified = generate_simple_self_signed(vec![String::from("localhost")])
            .expect("generate certificate");
        Self { certified }
    }

    fn write_pem(&self, dir: &TempDir, name: &str) -> Utf8PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, self.certified.cert.pem()).expect("write PEM bundle");
        Utf8PathBuf::from_path_buf(path).expect("utf8 path")
    }

    fn server_config(&self) -> Arc<ServerConfig> {
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
            self.certified.key_pair.serialize_der(),
        ));
        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::aws_lc_rs::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![self.certified.cert.der().clone()], key)
        .expect("server certificate");
        Arc::new(config)
    }
}

/// Serves one TLS connection, acknowledging each request line with its
/// `msgid`. Returns the lines received, or the handshake failure.
fn spawn_tls_server(identity: &Identity) -> (u16, JoinHandle<io::Result<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let config = identity.server_config();
    let handle = thread::spawn(move || {
        let (socket, _) = listener.accept()?;
        socket.set_read_timeout(Some(Duration::from_secs(5)))?;
        let session = ServerConnection::new(config).map_err(io::Error::other)?;
        let mut reader = BufReader::new(StreamOwned::new(session, socket));
        let mut requests = Vec::new();
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(error) if requests.is_empty() => return Err(error),
                Err(_) => break,
            }
            let request: serde_json::Value =
                serde_json::from_str(&line).map_err(io::Error::other)?;
            let reply = format!(
                "{{\"response\":\"ack\",\"msgid\":{}}}\n",
                request["msgid"].as_u64().unwrap_or_default()
            );
            requests.push(line);
            let stream = reader.get_mut();
            stream.write_all(reply.as_bytes())?;
            stream.flush()?;
        }
        Ok(requests)
    });
    (port, handle)
}

fn tls_settings(
    port: u16,
    verification: TlsVerification,
    ca_cert_path: Option<Utf8PathBuf>,
) -> TransportSettings {
    let config = Config {
        server: ServerEndpoint::tls("127.0.0.1", port),
        tls_verification: verification,
        ca_cert_path,
        server_name: Some(String::from("localhost")),
        read_timeout_ms: Some(5_000),
        ..Config::default()
    };
    TransportSettings::from(&config)
}

#[fixture]
fn identity() -> Identity {
    Identity::generate()
}

#[fixture]
fn bundle_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn ping(transport: &mut Transport, msgid: u64) -> Option<u64> {
    let line = format!("{{\"request\":\"ping\",\"msgid\":{msgid}}}\n");
    transport.write_line(line.as_bytes()).expect("write");
    transport.read_record().expect("read").msgid()
}

#[rstest]
fn insecure_policy_accepts_self_signed_server(identity: Identity) {
    let (port, server) = spawn_tls_server(&identity);
    let mut transport = Transport::new(tls_settings(port, TlsVerification::Insecure, None));

    transport.connect().expect("TLS connect");
    assert_eq!(ping(&mut transport, 1), Some(1));
    assert_eq!(ping(&mut transport, 2), Some(2));
    transport.close();

    let requests = server.join().expect("server thread").expect("server io");
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("{\"request\":\"ping\""));
}

#[rstest]
fn verify_policy_accepts_server_signed_by_bundle(identity: Identity, bundle_dir: TempDir) {
    let bundle = identity.write_pem(&bundle_dir, "ca.pem");
    let (port, server) = spawn_tls_server(&identity);
    let mut transport = Transport::new(tls_settings(port, TlsVerification::Verify, Some(bundle)));

    transport.connect().expect("verified TLS connect");
    assert_eq!(ping(&mut transport, 1), Some(1));
    transport.close();

    assert_eq!(
        server.join().expect("server thread").expect("server io").len(),
        1
    );
}

#[rstest]
fn verify_policy_rejects_unknown_issuer(identity: Identity, bundle_dir: TempDir) {
    let unrelated = Identity::generate().write_pem(&bundle_dir, "other.pem");
    let (port, server) = spawn_tls_server(&identity);
    let mut transport =
        Transport::new(tls_settings(port, TlsVerification::Verify, Some(unrelated)));

    let error = transport.connect().expect_err("untrusted certificate");

    assert_eq!(error.kind(), ErrorKind::Connection);
    assert!(!transport.is_open());
    let served = server.join().expect("server thread");
    assert!(served.map_or(true, |requests| requests.is_empty()));
}
