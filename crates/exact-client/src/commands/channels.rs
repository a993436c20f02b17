use crate::aggregate::Reply;
use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::{Channel, ChannelSelection, Request, Response};

impl ExactClient {
    /// Subscribes to notification channels.
    ///
    /// One channel is answered with a single record, several with a
    /// multi-element reply.
    ///
    /// # Errors
    ///
    /// Fails validation for an empty channel list, otherwise see
    /// [`ExactClient::exchange`].
    pub fn channel_join(&mut self, channels: &[Channel]) -> Result<Reply, ClientError> {
        let channel = ChannelSelection::new(channels)?;
        self.exchange(&Request::JoinChannel { channel })
    }

    /// Unsubscribes from notification channels.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::channel_join`].
    pub fn channel_leave(&mut self, channels: &[Channel]) -> Result<Reply, ClientError> {
        let channel = ChannelSelection::new(channels)?;
        self.exchange(&Request::LeaveChannel { channel })
    }

    /// Lists the channels this connection has joined.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn channel_list(&mut self) -> Result<Response, ClientError> {
        self.single(Request::ListChannels)
    }
}
