//! Harness shared by the behavioural scenarios.

mod fake_server;

use std::cell::RefCell;

use exact_config::{Config, ServerEndpoint};
use rstest::fixture;

pub(super) use fake_server::{FakeServer, Script};

use crate::{ClientError, ExactClient, Notification, Reply};

/// Scenario state. The client is declared first so it hangs up before the
/// server thread is joined.
pub(super) struct ClientWorld {
    pub client: ExactClient,
    pub server: Option<FakeServer>,
    pub reply: Option<Result<Reply, ClientError>>,
    pub notifications: Vec<Notification>,
    pub listen_result: Option<Result<(), ClientError>>,
}

impl ClientWorld {
    fn new() -> Self {
        Self {
            client: ExactClient::from_config(&offline_config()),
            server: None,
            reply: None,
            notifications: Vec::new(),
            listen_result: None,
        }
    }

    pub fn start_server(&mut self, script: Script) {
        let server = FakeServer::spawn(script).expect("failed to start fake server");
        self.server = Some(server);
    }

    pub fn connect(&mut self) {
        let port = self.server.as_ref().expect("server not started").port();
        let mut config = Config::default();
        config.server = ServerEndpoint::tcp("127.0.0.1", port);
        config.read_timeout_ms = Some(5_000);
        self.client = ExactClient::from_config(&config);
        self.client.connect().expect("connect to fake server");
    }

    /// Hangs up and returns the request lines the server read.
    pub fn server_requests(&mut self) -> Vec<String> {
        self.client.disconnect();
        self.server
            .as_mut()
            .expect("server not started")
            .take_requests()
            .expect("fake server requests")
    }

    pub fn reply(&self) -> &Reply {
        match self.reply.as_ref().expect("no request was made") {
            Ok(reply) => reply,
            Err(error) => panic!("request failed: {error}"),
        }
    }

    pub fn request_error(&self) -> &ClientError {
        match self.reply.as_ref().expect("no request was made") {
            Ok(reply) => panic!("request unexpectedly succeeded: {reply:?}"),
            Err(error) => error,
        }
    }
}

fn offline_config() -> Config {
    let mut config = Config::default();
    config.server = ServerEndpoint::tcp("127.0.0.1", 9);
    config
}

#[fixture]
pub(super) fn world() -> RefCell<ClientWorld> {
    RefCell::new(ClientWorld::new())
}
