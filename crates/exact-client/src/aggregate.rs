//! Reply collection for the two response shapes of the protocol.
//!
//! Which shape a request gets is fixed by its kind and passed in by the
//! caller; the aggregator never infers it from the first record. The same
//! `element` discriminator ends a single-mode exchange but is just payload in
//! multi mode.

use tracing::debug;

use crate::codec::Record;
use crate::errors::ClientError;
use crate::message::{Response, ResponseKind, ServerError};
use crate::transport::Transport;

/// How the records answering a request are gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// Return the first `ack`, `end`, `error` or `element` record.
    Single,
    /// Return every record up to and including `ack`, `end` or `error`.
    Multi,
}

/// Result of a request, shaped by its [`AggregationMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Single(Response),
    Multi(Vec<Response>),
}

impl Reply {
    /// Reply returned when no connection is open.
    #[must_use]
    pub fn empty(mode: AggregationMode) -> Self {
        match mode {
            AggregationMode::Single => Self::Single(Response::empty()),
            AggregationMode::Multi => Self::Multi(Vec::new()),
        }
    }

    #[must_use]
    pub fn mode(&self) -> AggregationMode {
        match self {
            Self::Single(_) => AggregationMode::Single,
            Self::Multi(_) => AggregationMode::Multi,
        }
    }

    /// Returns `true` when nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(response) => response.is_empty(),
            Self::Multi(responses) => responses.is_empty(),
        }
    }

    /// Records in receipt order.
    #[must_use]
    pub fn responses(&self) -> &[Response] {
        match self {
            Self::Single(response) => std::slice::from_ref(response),
            Self::Multi(responses) => responses,
        }
    }

    #[must_use]
    pub fn into_responses(self) -> Vec<Response> {
        match self {
            Self::Single(response) => vec![response],
            Self::Multi(responses) => responses,
        }
    }

    /// The single response, or the terminating record of a multi-element
    /// reply. Empty when nothing was received.
    #[must_use]
    pub fn into_single(self) -> Response {
        match self {
            Self::Single(response) => response,
            Self::Multi(mut responses) => responses.pop().unwrap_or_default(),
        }
    }

    /// Record that ended the exchange.
    #[must_use]
    pub fn terminator(&self) -> Option<&Response> {
        self.responses().last()
    }

    /// `element` records, excluding the `begin` and terminating records of
    /// a multi-element reply.
    pub fn elements(&self) -> impl Iterator<Item = &Response> {
        self.responses()
            .iter()
            .filter(|response| response.kind() == Some(ResponseKind::Element))
    }

    /// Server error that ended the exchange, if any.
    #[must_use]
    pub fn server_error(&self) -> Option<ServerError> {
        self.terminator().and_then(Response::server_error)
    }
}

/// Supplies decoded records to the aggregator.
pub trait RecordSource {
    /// Blocks until the next record is available.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode failure that prevented a read.
    fn next_record(&mut self) -> Result<Record, ClientError>;
}

impl RecordSource for Transport {
    fn next_record(&mut self) -> Result<Record, ClientError> {
        self.read_record()
    }
}

/// Reads records from `source` until the exchange ends.
///
/// # Errors
///
/// Propagates the first read failure; records read before it are dropped.
pub fn collect<S: RecordSource + ?Sized>(
    source: &mut S,
    mode: AggregationMode,
) -> Result<Reply, ClientError> {
    match mode {
        AggregationMode::Single => collect_single(source).map(Reply::Single),
        AggregationMode::Multi => collect_multi(source).map(Reply::Multi),
    }
}

fn collect_single<S: RecordSource + ?Sized>(source: &mut S) -> Result<Response, ClientError> {
    loop {
        let response = Response::from(source.next_record()?);
        match response.kind() {
            Some(kind) if kind.is_terminal() || kind == ResponseKind::Element => {
                return Ok(response);
            }
            kind => debug!(
                target: "exact_client::aggregate",
                ?kind,
                "skipping non-terminal record"
            ),
        }
    }
}

fn collect_multi<S: RecordSource + ?Sized>(source: &mut S) -> Result<Vec<Response>, ClientError> {
    let mut responses = Vec::new();
    loop {
        let response = Response::from(source.next_record()?);
        let done = response.kind().is_some_and(|kind| kind.is_terminal());
        responses.push(response);
        if done {
            return Ok(responses);
        }
    }
}
