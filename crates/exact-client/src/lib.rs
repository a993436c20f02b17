//! Blocking client for the EXACT protocol spoken by EXL location servers.
//!
//! The protocol carries one JSON object per line over TLS. Requests name
//! their kind in a `request` field and carry a `msgid`; the server answers
//! with records whose `response` field is `ack`, `error`, `begin`,
//! `element` or `end`, and pushes unsolicited notifications tagged with a
//! `channel`.
//!
//! [`ExactClient`] owns the single connection and the msgid counter.
//! [`ExactClient::exchange`] writes a [`Request`] and gathers the reply in
//! the shape fixed for its kind, either one [`Response`] or the whole
//! `begin`/`element`/`end` sequence. Convenience methods such as
//! [`ExactClient::cell_add`] and [`ExactClient::channel_join`] build the
//! requests for each resource. Once the caller is done issuing requests,
//! [`ExactClient::listen`] turns the connection into a notification stream,
//! and [`NotificationFeed`] runs that loop on a worker thread.
//!
//! A client that is not connected does not fail: every exchange returns an
//! empty reply without touching the network. Payload validation still
//! applies and reports [`ValidationError`]s.

mod aggregate;
mod client;
pub mod codec;
mod commands;
mod errors;
pub mod message;
mod notification;
mod sequencer;
pub mod transport;

pub use aggregate::{AggregationMode, RecordSource, Reply, collect};
pub use client::ExactClient;
pub use codec::Record;
pub use errors::{ClientError, ErrorKind};
pub use message::{Channel, Notification, Request, Response, ResponseKind, ValidationError};
pub use notification::{NotificationFeed, NotificationState, POLL_INTERVAL, StopHandle};
pub use sequencer::Sequencer;
pub use transport::{Transport, TransportSettings};

#[cfg(test)]
mod tests;
