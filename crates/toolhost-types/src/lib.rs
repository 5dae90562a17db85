//! Wire types exchanged between the tool host and its callers.
//!
//! A caller posts a [`CommandRequest`] as the JSON body of an HTTP `POST` and
//! receives a [`CommandResponse`] in return. Both sides of the connection use
//! these definitions so the field names stay in lockstep.

use serde::{Deserialize, Serialize};

/// Invocation of one registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Registered command name, matched exactly.
    pub command: String,
    /// Arguments forwarded to the command in order.
    pub args: Vec<String>,
}

impl CommandRequest {
    /// Builds a request for `command` with the given arguments.
    #[must_use]
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of one command: its status and everything it printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Status chosen by the handler; zero denotes success.
    pub status_code: i32,
    /// Text written to the captured standard output.
    pub stdout: String,
    /// Text written to the captured standard error.
    pub stderr: String,
}

impl CommandResponse {
    /// Builds a response from a status and the two captured streams.
    #[must_use]
    pub fn new(status_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}
