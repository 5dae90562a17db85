//! Error types for request dispatch failures.
//!
//! Every variant is request-level: the connection survives and the client
//! receives a status-coded response whose stderr carries the rendered error.

use thiserror::Error;

/// Errors surfaced while decoding or executing a command request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The body is not a JSON object of the expected shape.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// Human-readable cause.
        message: String,
        /// Decoder error, when one was raised.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// No handler is registered under the requested name.
    #[error("unknown command '{command}'")]
    UnknownCommand {
        /// The requested command name.
        command: String,
    },

    /// The body exceeds the configured size limit.
    #[error("request too large: body exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Configured limit in bytes.
        max_size: usize,
    },

    /// The body could not be read from the connection.
    #[error("failed to read request body: {message}")]
    ReadBody {
        /// Transport error text.
        message: String,
    },

    /// The handler task panicked before producing a status.
    #[error("handler for '{command}' panicked")]
    HandlerPanicked {
        /// Command whose handler failed.
        command: String,
    },
}

impl DispatchError {
    /// Status code reported to the client for this error.
    ///
    /// All dispatch failures are reported the same way a failing command
    /// would be, with status 1.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::MalformedRequest { .. }
            | Self::UnknownCommand { .. }
            | Self::RequestTooLarge { .. }
            | Self::ReadBody { .. }
            | Self::HandlerPanicked { .. } => 1,
        }
    }

    /// Creates a malformed request error from a decoder error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates a body read error.
    pub fn read_body(error: impl std::fmt::Display) -> Self {
        Self::ReadBody {
            message: error.to_string(),
        }
    }

    /// Creates a handler panic error.
    pub fn handler_panicked(command: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            command: command.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::malformed(DispatchError::malformed("empty request body"))]
    #[case::unknown(DispatchError::unknown_command("deploy"))]
    #[case::too_large(DispatchError::RequestTooLarge { max_size: 16 })]
    #[case::read(DispatchError::read_body("connection reset"))]
    #[case::panicked(DispatchError::handler_panicked("artifact"))]
    fn every_dispatch_error_reports_status_one(#[case] error: DispatchError) {
        assert_eq!(error.exit_status(), 1);
    }

    #[rstest]
    fn unknown_command_names_the_command() {
        let error = DispatchError::unknown_command("deploy");
        assert_eq!(error.to_string(), "unknown command 'deploy'");
    }

    #[rstest]
    fn json_errors_keep_their_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let error = DispatchError::from_json_error(source);
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("malformed request: "));
    }
}
