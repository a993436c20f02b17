//! Message model: outbound requests, inbound responses and notifications.

mod channel;
mod inbound;
mod requests;
mod validation;
pub mod views;

pub use channel::{Channel, ChannelSelection};
pub use inbound::{ChannelPayload, Notification, Response, ResponseKind};
pub use requests::{
    BaseStation, BaseStationUpdate, Cell, CellUpdate, ConfigItem, DEFAULT_TAG_MODE, DeviceId,
    MAX_ORIENTATION_DEGREES, Request, Tag, TagMode, TagNotification, User, UserLogin, UserRole,
    UserUpdate,
};
pub use validation::ValidationError;
pub use views::ServerError;
