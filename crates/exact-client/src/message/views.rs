//! Typed views over inbound records.
//!
//! Views are built on demand with [`Record::view`](crate::Record::view) and
//! never participate in framing or aggregation. Fields the server may leave
//! out are `Option`s so that a sparse record still yields a view.

use serde::Deserialize;
use serde_json::Value;

use super::requests::UserRole;

/// Payload of a server `error` response.
///
/// Missing fields decode as `0` and an empty description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub desc: String,
}

/// User account returned by `getUser` and `listUsers` elements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<UserRole>>,
}

/// Element carrying a user account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserAccountElement {
    pub user: UserAccount,
}

/// Notification pushed on the `error` channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorNotification {
    pub code: i64,
    pub desc: String,
}

/// Notification pushed on the `debug` channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebugNotification {
    pub message: String,
}

/// Lifecycle events reported on the `clients` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientEvent {
    Connected,
    Disconnected,
    Login,
    Logout,
    Subscribed,
    Unsubscribed,
}

/// Notification pushed on the `clients` channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientNotification {
    pub conn: String,
    pub ip_address: String,
    pub event: Vec<ClientEvent>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub target_channel: Option<String>,
}

/// Alert events reported on the `alerts` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertEvent {
    Lost,
    Compromised,
    Cancel,
}

/// Notification pushed on the `alerts` channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertNotification {
    pub alert: String,
    pub event: Vec<AlertEvent>,
    pub bs: String,
    pub desc: String,
}

/// Ranging measurements pushed on the `measurements` channel.
///
/// Each entry of `meas` is `[bs_id, distance, signal_power, ...]`; the
/// arity depends on the measurement type, so entries stay untyped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasurementsNotification {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    pub tag: String,
    pub meas: Vec<Vec<Value>>,
}

/// Sensor readings pushed on the `sensors` channel, keyed by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorNotification {
    Temp {
        time: String,
        tag: String,
        temp: f64,
    },
    Pressure {
        time: String,
        tag: String,
        pressure: f64,
    },
    Humidity {
        time: String,
        tag: String,
        humidity: u8,
    },
}

impl SensorNotification {
    /// Tag that produced the reading.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Temp { tag, .. } | Self::Pressure { tag, .. } | Self::Humidity { tag, .. } => {
                tag
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Velocity {
    pub speed: f64,
    pub vertical: f64,
    pub heading_lcl: f64,
    #[serde(default)]
    pub heading_trf: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Accuracy {
    pub horizontal: f64,
    pub vertical: f64,
}

/// Position fix pushed on the `solution` channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolutionNotification {
    pub time: String,
    pub tag: String,
    pub validity: String,
    pub position_lcl: Vec<f64>,
    pub position_trf: Vec<f64>,
    pub velocity: Velocity,
    pub accuracy: Accuracy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;

    #[test]
    fn sensor_view_dispatches_on_type() {
        let record =
            decode(br#"{"channel":"sensors","type":"humidity","time":"t","tag":"7F","humidity":41}"#)
                .expect("decode");
        let reading: SensorNotification = record.view().expect("view");
        assert_eq!(
            reading,
            SensorNotification::Humidity {
                time: String::from("t"),
                tag: String::from("7F"),
                humidity: 41,
            }
        );
        assert_eq!(reading.tag(), "7F");
    }

    #[test]
    fn client_view_tolerates_null_optionals() {
        let record = decode(
            br#"{"channel":"clients","conn":"c1","ip_address":"10.0.0.9","event":["login"],"user":"ops","reason":null}"#,
        )
        .expect("decode");
        let view: ClientNotification = record.view().expect("view");
        assert_eq!(view.event, [ClientEvent::Login]);
        assert_eq!(view.reason, None);
        assert_eq!(view.target_channel, None);
    }

    #[test]
    fn user_account_element_parses_roles() {
        let record = decode(
            br#"{"response":"element","msgid":4,"user":{"id":2,"login":"ops","roles":["admin"]}}"#,
        )
        .expect("decode");
        let element: UserAccountElement = record.view().expect("view");
        assert_eq!(element.user.roles, Some(vec![UserRole::Admin]));
        assert_eq!(element.user.desc, None);
    }
}
