use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::{Request, Response};

impl ExactClient {
    /// Authenticates the connection.
    ///
    /// # Errors
    ///
    /// Fails validation for an empty user name, otherwise see
    /// [`ExactClient::exchange`].
    pub fn login(&mut self, user: &str, password: &str) -> Result<Response, ClientError> {
        self.single(Request::Login {
            user: user.to_owned(),
            password: password.to_owned(),
        })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn logout(&mut self) -> Result<Response, ClientError> {
        self.single(Request::Logout)
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn ping(&mut self) -> Result<Response, ClientError> {
        self.single(Request::Ping)
    }
}
