//! Outbound request catalogue.
//!
//! [`Request`] is a sum type keyed by the `request` discriminator. Each variant
//! carries only its own fields; optional fields are plain `Option`s and the
//! codec removes the unset ones. The `msgid` is not part of the request, the
//! sequencer supplies it when the frame is encoded.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::channel::ChannelSelection;
use super::validation::{
    ValidationError, require_finite, require_hex_id, require_range, require_text,
};
use crate::aggregate::AggregationMode;

/// Highest base-station mounting angle in degrees.
pub const MAX_ORIENTATION_DEGREES: u16 = 359;

/// Tag operating mode used when the caller does not pick one.
pub const DEFAULT_TAG_MODE: u32 = 1;

/// Role granted to a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    /// Parses a role name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownRole`] for unrecognised names.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        Self::from_str(name).map_err(|_| ValidationError::UnknownRole(name.to_owned()))
    }
}

/// System configuration items that `getConfig` can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfigItem {
    Coordinates,
    Altitude,
}

impl ConfigItem {
    /// Parses a configuration item name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownConfigItem`] for unrecognised names.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        Self::from_str(name).map_err(|_| ValidationError::UnknownConfigItem(name.to_owned()))
    }
}

/// Hexadecimal identifier of a cell, base station or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceId {
    pub id: String,
}

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// New user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub login: String,
    pub password: String,
    pub roles: Option<Vec<UserRole>>,
    pub desc: Option<String>,
}

/// Changes to an existing user account. Supplying `new_roles` replaces
/// every role previously granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    pub login: String,
    pub new_login: Option<String>,
    pub new_password: Option<String>,
    pub new_roles: Option<Vec<UserRole>>,
    pub new_desc: Option<String>,
}

/// Reference to a user account by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserLogin {
    pub login: String,
}

/// Cell definition; `ip_address` names the cell's master base station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: String,
    pub desc: Option<String>,
    pub ip_address: String,
    pub port: Option<u16>,
}

/// Changes to a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CellUpdate {
    pub id: String,
    pub desc: Option<String>,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
}

/// Base station placed in the local frame.
///
/// `orientation` is measured anti-clockwise from the local Y axis, in
/// degrees within `0..=359`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStation {
    pub id: String,
    pub desc: Option<String>,
    pub position: [f64; 3],
    pub orientation: u16,
    pub cell_id: String,
}

/// Changes to a base station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStationUpdate {
    pub id: String,
    pub desc: Option<String>,
    pub position: Option<[f64; 3]>,
    pub orientation: u16,
    pub cell_id: String,
}

/// Tag operating mode, either a mode number or a named alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagMode {
    Number(u32),
    Alias(String),
}

impl Default for TagMode {
    fn default() -> Self {
        Self::Number(DEFAULT_TAG_MODE)
    }
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: String,
    pub desc: Option<String>,
    pub mode: Option<TagMode>,
    pub alt: Option<f64>,
}

impl Tag {
    /// Tag with the default operating mode and no description or altitude.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: None,
            mode: Some(TagMode::default()),
            alt: None,
        }
    }
}

/// Payload pushed to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagNotification {
    pub id: Option<String>,
    pub data: String,
}

/// Requests understood by the EXL server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request")]
pub enum Request {
    #[serde(rename = "login")]
    Login { user: String, password: String },
    #[serde(rename = "logout")]
    Logout,
    #[serde(rename = "ping")]
    Ping,

    #[serde(rename = "createUser")]
    CreateUser { user: User },
    #[serde(rename = "updateUser")]
    UpdateUser { user: UserUpdate },
    #[serde(rename = "removeUser")]
    RemoveUser { user: UserLogin },
    #[serde(rename = "getUser")]
    GetUser { user: UserLogin },
    #[serde(rename = "listUsers")]
    ListUsers,

    /// `origin` is `[latitude, longitude, altitude]` of the local frame;
    /// `orientation` is the angle from WGS84 east to the local X axis.
    #[serde(rename = "setCoordinates")]
    SetCoordinates { origin: [f64; 3], orientation: f64 },
    #[serde(rename = "setAltitude")]
    SetAltitude { altitude: f64 },
    #[serde(rename = "getConfig")]
    GetConfig { item: ConfigItem },
    #[serde(rename = "resetAllConfig")]
    ResetAllConfig,

    #[serde(rename = "addCell")]
    AddCell { cell: Cell },
    #[serde(rename = "updateCell")]
    UpdateCell { cell: CellUpdate },
    #[serde(rename = "removeCell")]
    RemoveCell { cell: DeviceId },
    #[serde(rename = "removeAllCells")]
    RemoveAllCells,
    #[serde(rename = "listCells")]
    ListCells,

    #[serde(rename = "addBS")]
    AddBaseStation { bs: BaseStation },
    #[serde(rename = "updateBS")]
    UpdateBaseStation { bs: BaseStationUpdate },
    #[serde(rename = "removeBS")]
    RemoveBaseStation { bs: DeviceId },
    /// Limited to one cell's base stations when `cell` is set.
    #[serde(rename = "removeAllBS")]
    RemoveAllBaseStations { cell: Option<DeviceId> },
    #[serde(rename = "listBS")]
    ListBaseStations,

    #[serde(rename = "addTag")]
    AddTag { tag: Tag },
    #[serde(rename = "updateTag")]
    UpdateTag { tag: Tag },
    #[serde(rename = "removeTag")]
    RemoveTag { tag: DeviceId },
    #[serde(rename = "removeAllTag")]
    RemoveAllTags,
    #[serde(rename = "listTags")]
    ListTags,
    #[serde(rename = "sendNtfn")]
    SendTagNotification {
        tag_id: Option<String>,
        ntfn: TagNotification,
    },

    #[serde(rename = "joinChannel")]
    JoinChannel { channel: ChannelSelection },
    #[serde(rename = "leaveChannel")]
    LeaveChannel { channel: ChannelSelection },
    #[serde(rename = "listChannels")]
    ListChannels,
}

impl Request {
    /// Value of the `request` discriminator.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Ping => "ping",
            Self::CreateUser { .. } => "createUser",
            Self::UpdateUser { .. } => "updateUser",
            Self::RemoveUser { .. } => "removeUser",
            Self::GetUser { .. } => "getUser",
            Self::ListUsers => "listUsers",
            Self::SetCoordinates { .. } => "setCoordinates",
            Self::SetAltitude { .. } => "setAltitude",
            Self::GetConfig { .. } => "getConfig",
            Self::ResetAllConfig => "resetAllConfig",
            Self::AddCell { .. } => "addCell",
            Self::UpdateCell { .. } => "updateCell",
            Self::RemoveCell { .. } => "removeCell",
            Self::RemoveAllCells => "removeAllCells",
            Self::ListCells => "listCells",
            Self::AddBaseStation { .. } => "addBS",
            Self::UpdateBaseStation { .. } => "updateBS",
            Self::RemoveBaseStation { .. } => "removeBS",
            Self::RemoveAllBaseStations { .. } => "removeAllBS",
            Self::ListBaseStations => "listBS",
            Self::AddTag { .. } => "addTag",
            Self::UpdateTag { .. } => "updateTag",
            Self::RemoveTag { .. } => "removeTag",
            Self::RemoveAllTags => "removeAllTag",
            Self::ListTags => "listTags",
            Self::SendTagNotification { .. } => "sendNtfn",
            Self::JoinChannel { .. } => "joinChannel",
            Self::LeaveChannel { .. } => "leaveChannel",
            Self::ListChannels => "listChannels",
        }
    }

    /// How the reply to this request is collected.
    ///
    /// Listing requests and channel requests naming several channels are
    /// answered with a `begin`/`element`/`end` stream; everything else is
    /// answered with one record.
    #[must_use]
    pub fn mode(&self) -> AggregationMode {
        match self {
            Self::ListUsers | Self::ListCells | Self::ListBaseStations | Self::ListTags => {
                AggregationMode::Multi
            }
            Self::JoinChannel { channel } | Self::LeaveChannel { channel } => match channel {
                ChannelSelection::One(_) => AggregationMode::Single,
                ChannelSelection::Many(_) => AggregationMode::Multi,
            },
            _ => AggregationMode::Single,
        }
    }

    /// Checks payload constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Login { user, .. } => require_text("user", user),
            Self::CreateUser { user } => {
                require_text("user.login", &user.login)?;
                require_text("user.password", &user.password)
            }
            Self::UpdateUser { user } => {
                require_text("user.login", &user.login)?;
                if let Some(new_login) = &user.new_login {
                    require_text("user.new_login", new_login)?;
                }
                Ok(())
            }
            Self::RemoveUser { user } | Self::GetUser { user } => {
                require_text("user.login", &user.login)
            }
            Self::SetCoordinates {
                origin: [latitude, longitude, altitude],
                orientation,
            } => {
                require_range("origin.latitude", *latitude, -90.0, 90.0)?;
                require_range("origin.longitude", *longitude, -180.0, 180.0)?;
                require_finite("origin.altitude", *altitude)?;
                require_finite("orientation", *orientation)
            }
            Self::SetAltitude { altitude } => require_finite("altitude", *altitude),
            Self::AddCell { cell } => {
                require_hex_id("cell.id", &cell.id)?;
                require_text("cell.ip_address", &cell.ip_address)
            }
            Self::UpdateCell { cell } => {
                require_hex_id("cell.id", &cell.id)?;
                if let Some(address) = &cell.ip_address {
                    require_text("cell.ip_address", address)?;
                }
                Ok(())
            }
            Self::RemoveCell { cell } => require_hex_id("cell.id", &cell.id),
            Self::AddBaseStation { bs } => validate_base_station(
                &bs.id,
                &bs.cell_id,
                Some(&bs.position),
                bs.orientation,
            ),
            Self::UpdateBaseStation { bs } => validate_base_station(
                &bs.id,
                &bs.cell_id,
                bs.position.as_ref(),
                bs.orientation,
            ),
            Self::RemoveBaseStation { bs } => require_hex_id("bs.id", &bs.id),
            Self::RemoveAllBaseStations { cell } => match cell {
                Some(cell) => require_hex_id("cell.id", &cell.id),
                None => Ok(()),
            },
            Self::AddTag { tag } | Self::UpdateTag { tag } => {
                require_hex_id("tag.id", &tag.id)?;
                if let Some(alt) = tag.alt {
                    require_finite("tag.alt", alt)?;
                }
                Ok(())
            }
            Self::RemoveTag { tag } => require_hex_id("tag.id", &tag.id),
            Self::SendTagNotification { tag_id, .. } => match tag_id {
                Some(tag_id) => require_hex_id("tag_id", tag_id),
                None => Ok(()),
            },
            Self::JoinChannel { channel } | Self::LeaveChannel { channel } => {
                if channel.channels().is_empty() {
                    return Err(ValidationError::NoChannels);
                }
                Ok(())
            }
            Self::Logout
            | Self::Ping
            | Self::ListUsers
            | Self::GetConfig { .. }
            | Self::ResetAllConfig
            | Self::RemoveAllCells
            | Self::ListCells
            | Self::ListBaseStations
            | Self::RemoveAllTags
            | Self::ListTags
            | Self::ListChannels => Ok(()),
        }
    }
}

fn validate_base_station(
    id: &str,
    cell_id: &str,
    position: Option<&[f64; 3]>,
    orientation: u16,
) -> Result<(), ValidationError> {
    require_hex_id("bs.id", id)?;
    require_hex_id("bs.cell_id", cell_id)?;
    if let Some(position) = position {
        for coordinate in position {
            require_finite("bs.position", *coordinate)?;
        }
    }
    require_range(
        "bs.orientation",
        f64::from(orientation),
        0.0,
        f64::from(MAX_ORIENTATION_DEGREES),
    )
}
