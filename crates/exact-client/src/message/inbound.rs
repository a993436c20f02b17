//! Inbound records wrapped by their discriminator.

use serde::de::DeserializeOwned;

use super::channel::Channel;
use super::views::{
    AlertNotification, ClientNotification, DebugNotification, ErrorNotification,
    MeasurementsNotification, SensorNotification, ServerError, SolutionNotification,
};
use crate::codec::Record;

const RESPONSE_KEY: &str = "response";
const CHANNEL_KEY: &str = "channel";

/// Value of a response's `response` discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    Ack,
    Error,
    Begin,
    Element,
    End,
    /// Resource-specific kind not known to the protocol core.
    Other(String),
}

impl ResponseKind {
    fn from_wire(kind: &str) -> Self {
        match kind {
            "ack" => Self::Ack,
            "error" => Self::Error,
            "begin" => Self::Begin,
            "element" => Self::Element,
            "end" => Self::End,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns `true` for `ack`, `end` and `error`, the kinds that close
    /// every exchange.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ack | Self::End | Self::Error)
    }
}

/// Record received in reply to a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    record: Record,
}

impl Response {
    /// Response standing in for a reply that was never read because the
    /// client had no connection.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` when the response holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    /// Discriminator, `None` when the record carries no `response` string.
    #[must_use]
    pub fn kind(&self) -> Option<ResponseKind> {
        self.record.str_field(RESPONSE_KEY).map(ResponseKind::from_wire)
    }

    #[must_use]
    pub fn msgid(&self) -> Option<u64> {
        self.record.msgid()
    }

    /// Code and description of a server `error` response.
    ///
    /// Every `error` response yields a value; fields that are absent or
    /// mistyped fall back to [`ServerError::default`].
    #[must_use]
    pub fn server_error(&self) -> Option<ServerError> {
        if self.kind() != Some(ResponseKind::Error) {
            return None;
        }
        Some(self.record.view().unwrap_or_default())
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Deserialises the response into a typed view.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the record does not match `T`.
    pub fn view<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.record.view()
    }
}

impl From<Record> for Response {
    fn from(record: Record) -> Self {
        Self { record }
    }
}

/// Unsolicited record pushed on a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    record: Record,
}

/// Typed payload of a notification, chosen by its channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelPayload {
    Alerts(AlertNotification),
    Clients(ClientNotification),
    Debug(DebugNotification),
    Error(ErrorNotification),
    Measurements(MeasurementsNotification),
    Sensors(SensorNotification),
    Solution(SolutionNotification),
    /// Channel without a typed view (`systemtime`, `tags`) or an unknown
    /// channel name.
    Untyped,
}

impl Notification {
    /// Channel name as sent by the server.
    #[must_use]
    pub fn channel_name(&self) -> Option<&str> {
        self.record.str_field(CHANNEL_KEY)
    }

    /// Channel, `None` when absent or not a known channel name.
    #[must_use]
    pub fn channel(&self) -> Option<Channel> {
        self.channel_name()
            .and_then(|name| name.parse::<Channel>().ok())
    }

    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Deserialises the notification into a typed view.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the record does not match `T`.
    pub fn view<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.record.view()
    }

    /// Typed payload for the notification's channel.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the record does not match the view of
    /// its channel.
    pub fn payload(&self) -> Result<ChannelPayload, serde_json::Error> {
        let payload = match self.channel() {
            Some(Channel::Alerts) => ChannelPayload::Alerts(self.view()?),
            Some(Channel::Clients) => ChannelPayload::Clients(self.view()?),
            Some(Channel::Debug) => ChannelPayload::Debug(self.view()?),
            Some(Channel::Error) => ChannelPayload::Error(self.view()?),
            Some(Channel::Measurements) => ChannelPayload::Measurements(self.view()?),
            Some(Channel::Sensors) => ChannelPayload::Sensors(self.view()?),
            Some(Channel::Solution) => ChannelPayload::Solution(self.view()?),
            Some(Channel::All | Channel::Systemtime | Channel::Tags) | None => {
                ChannelPayload::Untyped
            }
        };
        Ok(payload)
    }
}

impl From<Record> for Notification {
    fn from(record: Record) -> Self {
        Self { record }
    }
}
