use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats supported by the tracing subscriber.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON lines for log aggregation.
    #[default]
    Json,
    /// Single-line human-readable output.
    Compact,
}

/// Error raised when a [`LogFormat`] fails to parse from text.
pub type LogFormatParseError = strum::ParseError;
