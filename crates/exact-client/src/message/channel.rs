//! Notification channel names and channel subscription payloads.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::validation::ValidationError;

/// Channels a client can subscribe to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    /// Every channel the user is authorised for.
    #[serde(rename = "!all")]
    #[strum(serialize = "!all")]
    All,
    Alerts,
    Clients,
    Debug,
    Error,
    Measurements,
    Sensors,
    Solution,
    Systemtime,
    Tags,
}

impl Channel {
    /// Parses a channel name, reporting unknown names as validation errors.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownChannel`] for unrecognised names.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        Self::from_str(name).map_err(|_| ValidationError::UnknownChannel(name.to_owned()))
    }
}

/// Channel field of `joinChannel` and `leaveChannel`.
///
/// A single channel is sent as a bare string and answered with one
/// response; several channels are sent as an array and answered with a
/// multi-element response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChannelSelection {
    /// Exactly one channel.
    One(Channel),
    /// Two or more channels.
    Many(Vec<Channel>),
}

impl ChannelSelection {
    /// Builds the selection matching the number of channels given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoChannels`] when `channels` is empty.
    pub fn new(channels: &[Channel]) -> Result<Self, ValidationError> {
        match channels {
            [] => Err(ValidationError::NoChannels),
            [single] => Ok(Self::One(*single)),
            many => Ok(Self::Many(many.to_vec())),
        }
    }

    /// Parses channel names and builds the selection.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for unknown names or an empty list.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ValidationError> {
        let channels = names
            .iter()
            .map(|name| Channel::parse(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&channels)
    }

    /// Channels in the selection.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        match self {
            Self::One(channel) => std::slice::from_ref(channel),
            Self::Many(channels) => channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_channels_use_bang_prefix() {
        assert_eq!(Channel::parse("!all").unwrap(), Channel::All);
        assert_eq!(
            serde_json::to_string(&Channel::All).unwrap(),
            "\"!all\""
        );
        assert_eq!(Channel::Systemtime.to_string(), "systemtime");
    }

    #[test]
    fn unknown_channel_is_a_validation_error() {
        let error = Channel::parse("weather").unwrap_err();
        assert_eq!(error, ValidationError::UnknownChannel(String::from("weather")));
    }

    #[test]
    fn single_channel_serialises_as_string() {
        let selection = ChannelSelection::new(&[Channel::Solution]).unwrap();
        assert_eq!(serde_json::to_string(&selection).unwrap(), "\"solution\"");
    }

    #[test]
    fn several_channels_serialise_as_array() {
        let selection = ChannelSelection::parse(&["measurements", "solution"]).unwrap();
        assert_eq!(
            serde_json::to_string(&selection).unwrap(),
            r#"["measurements","solution"]"#
        );
        assert_eq!(selection.channels().len(), 2);
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(
            ChannelSelection::new(&[]).unwrap_err(),
            ValidationError::NoChannels
        );
    }
}
