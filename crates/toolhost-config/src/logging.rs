//! Output format of the server's own diagnostic log.

use strum::{Display, EnumIter, EnumString};

/// How log records are rendered on stderr.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per record, fields flattened.
    #[default]
    Json,
    /// Single-line text for terminals.
    Compact,
}

/// Error returned when text names no [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;
