//! Execution of the CLI subcommands against a live client.

use std::io::Write;

use exact_client::message::Channel;
use exact_client::{ClientError, ExactClient, Record, Response, ResponseKind, StopHandle};
use exact_config::Config;
use tracing::{info, warn};

use crate::cli::{Credentials, Resource};
use crate::errors::AppError;

const NOTIFICATION_TARGET: &str = "exact::notifications";

/// Connects and, when credentials were given, logs in.
pub(crate) fn open_session(
    config: &Config,
    credentials: &Credentials,
) -> Result<ExactClient, AppError> {
    let mut client = ExactClient::from_config(config);
    client.connect()?;
    if let Some(user) = &credentials.user {
        let password = credentials.password.as_deref().unwrap_or_default();
        let reply = client.login(user, password)?;
        ensure_accepted("login", &reply)?;
        info!(target: "exact", user, "logged in");
    }
    Ok(client)
}

/// Logs out when a session was opened, then disconnects.
pub(crate) fn close_session(
    mut client: ExactClient,
    credentials: &Credentials,
) -> Result<(), AppError> {
    if credentials.user.is_some() {
        let reply = client.logout()?;
        ensure_accepted("logout", &reply)?;
    }
    client.disconnect();
    Ok(())
}

pub(crate) fn ping<W: Write>(client: &mut ExactClient, out: &mut W) -> Result<(), AppError> {
    let reply = client.ping()?;
    ensure_accepted("ping", &reply)?;
    write_record(out, reply.record())
}

/// Writes every element of a listing, one JSON object per line.
pub(crate) fn list<W: Write>(
    client: &mut ExactClient,
    resource: Resource,
    out: &mut W,
) -> Result<(), AppError> {
    let (request, responses) = match resource {
        Resource::Users => ("listUsers", client.user_list()?),
        Resource::Cells => ("listCells", client.cell_list()?),
        Resource::BaseStations => ("listBS", client.bs_list()?),
        Resource::Tags => ("listTags", client.tag_list()?),
        Resource::Channels => {
            let reply = client.channel_list()?;
            ensure_accepted("listChannels", &reply)?;
            return write_record(out, reply.record());
        }
    };
    if let Some(last) = responses.last() {
        ensure_accepted(request, last)?;
    }
    responses
        .iter()
        .filter(|response| response.kind() == Some(ResponseKind::Element))
        .try_for_each(|element| write_record(out, element.record()))
}

/// Joins `channels`, streams notifications to `out` until `stop` is raised,
/// then leaves the channels again.
pub(crate) fn listen<W: Write>(
    client: &mut ExactClient,
    channels: &[String],
    stop: &StopHandle,
    out: &mut W,
) -> Result<(), AppError> {
    let channels = channels
        .iter()
        .map(|name| Channel::parse(name))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ClientError::from)?;

    let joined = client.channel_join(&channels)?;
    if let Some(error) = joined.server_error() {
        return Err(rejected("joinChannel", error));
    }
    let subscribed = client.channel_list()?;
    info!(
        target: "exact",
        channels = %subscribed.record().get("channel").map(ToString::to_string).unwrap_or_default(),
        "subscribed"
    );

    let mut output_error = None;
    client.listen(stop, |notification| {
        info!(
            target: NOTIFICATION_TARGET,
            channel = notification.channel_name().unwrap_or_default(),
            record = %serde_json::Value::Object(notification.record().fields().clone()),
            "notification"
        );
        if let Err(error) = write_record(out, notification.record()) {
            output_error = Some(error);
            stop.stop();
        }
    })?;
    if let Some(error) = output_error {
        return Err(error);
    }

    let left = client.channel_leave(&channels)?;
    if let Some(error) = left.server_error() {
        warn!(target: "exact", code = error.code, desc = %error.desc, "leaving channels failed");
    }
    Ok(())
}

/// Fails on any `error` response, whether or not its details decode.
fn ensure_accepted(request: &'static str, response: &Response) -> Result<(), AppError> {
    if response.kind() != Some(ResponseKind::Error) {
        return Ok(());
    }
    Err(rejected(request, response.server_error().unwrap_or_default()))
}

fn rejected(request: &'static str, error: exact_client::message::ServerError) -> AppError {
    AppError::Rejected {
        request,
        code: error.code,
        desc: error.desc,
    }
}

fn write_record<W: Write>(out: &mut W, record: &Record) -> Result<(), AppError> {
    serde_json::to_writer(&mut *out, record).map_err(AppError::SerialiseRecord)?;
    out.write_all(b"\n").map_err(AppError::WriteOutput)?;
    out.flush().map_err(AppError::WriteOutput)
}
