//! Versions of the command table a server instance can expose.
//!
//! The set of commands changes between releases of the wrapped toolchain. Each
//! release is pinned as one variant here and chosen once at startup; a running
//! server never switches tables.

use strum::{Display, EnumIter, EnumString};

/// Command table revision selected at startup.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CommandTableVersion {
    /// The tool main and the compiler main.
    V1,
    /// Adds class hash derivation.
    V2,
    /// Renames the compiler and adds compiled class hash derivation.
    #[default]
    V3,
}

/// Errors encountered while parsing a [`CommandTableVersion`] from text.
pub type CommandTableVersionParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("v1", CommandTableVersion::V1)]
    #[case("V2", CommandTableVersion::V2)]
    #[case("v3", CommandTableVersion::V3)]
    fn parses_versions_case_insensitively(
        #[case] input: &str,
        #[case] expected: CommandTableVersion,
    ) {
        assert_eq!(
            CommandTableVersion::from_str(input).expect("version parses"),
            expected
        );
    }

    #[rstest]
    fn display_round_trips_through_from_str() {
        for version in CommandTableVersion::iter() {
            let text = version.to_string();
            assert_eq!(
                CommandTableVersion::from_str(&text).expect("display output parses"),
                version
            );
        }
    }

    #[rstest]
    fn rejects_unknown_versions() {
        assert!(CommandTableVersion::from_str("v9").is_err());
    }
}
