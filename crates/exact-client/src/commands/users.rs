use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::{Request, Response, User, UserLogin, UserUpdate};

impl ExactClient {
    /// Creates a user account. Requires an administrator session.
    ///
    /// # Errors
    ///
    /// Fails validation for an empty login or password, otherwise see
    /// [`ExactClient::exchange`].
    pub fn user_create(&mut self, user: User) -> Result<Response, ClientError> {
        self.single(Request::CreateUser { user })
    }

    /// Updates a user account; `new_roles` replaces every existing role.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn user_update(&mut self, user: UserUpdate) -> Result<Response, ClientError> {
        self.single(Request::UpdateUser { user })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn user_remove(&mut self, login: &str) -> Result<Response, ClientError> {
        self.single(Request::RemoveUser {
            user: user_login(login),
        })
    }

    /// Fetches one account; the reply is an `element` record whose `user`
    /// field reads as [`UserAccount`](crate::message::views::UserAccount).
    ///
    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn user_get(&mut self, login: &str) -> Result<Response, ClientError> {
        self.single(Request::GetUser {
            user: user_login(login),
        })
    }

    /// Lists every account as a `begin`/`element`/`end` sequence.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn user_list(&mut self) -> Result<Vec<Response>, ClientError> {
        self.multi(Request::ListUsers)
    }
}

fn user_login(login: &str) -> UserLogin {
    UserLogin {
        login: login.to_owned(),
    }
}
