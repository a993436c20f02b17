//! Resource operations built on [`ExactClient::exchange`].
//!
//! Each method builds one [`Request`] and returns the reply in the shape
//! fixed for its kind: a [`Response`] for single-record replies, the full
//! record sequence for listings, and a [`Reply`](crate::Reply) for channel
//! requests whose shape depends on how many channels were named.

mod channels;
mod devices;
mod session;
mod system;
mod users;

use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::{Request, Response};

impl ExactClient {
    fn single(&mut self, request: Request) -> Result<Response, ClientError> {
        Ok(self.exchange(&request)?.into_single())
    }

    fn multi(&mut self, request: Request) -> Result<Vec<Response>, ClientError> {
        Ok(self.exchange(&request)?.into_responses())
    }
}
