//! Error type for the CLI runtime.

use std::io;
use std::sync::Arc;

use exact_client::ClientError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("server rejected {request} (code {code}): {desc}")]
    Rejected {
        request: &'static str,
        code: i64,
        desc: String,
    },
    #[error("failed to install signal handlers: {0}")]
    Signal(io::Error),
    #[error("failed to serialise record: {0}")]
    SerialiseRecord(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
