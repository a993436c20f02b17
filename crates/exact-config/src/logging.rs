//! Output format of the `exact` diagnostics written to stderr.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Layout of each `tracing` event the CLI emits.
///
/// Notifications streamed by `exact listen` go to stdout as JSON lines
/// whatever this is set to; only the diagnostic log on stderr changes.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event, with RFC 3339 timestamps.
    #[default]
    Json,
    /// Terse `target: message key=value` lines for terminals.
    Compact,
}

/// Returned when `--log-format` or `EXACT_LOG_FORMAT` names no format.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_the_default_layout() {
        assert_eq!(LogFormat::default(), LogFormat::Json);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn unknown_layouts_do_not_parse() {
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }
}
