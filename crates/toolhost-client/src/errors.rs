//! Error types for the caller side of the tool host.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use hyper::StatusCode;
use hyper::header::InvalidHeaderValue;
use thiserror::Error;

/// Errors surfaced while talking to, spawning or locating a tool host.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A request to a running tool host failed.
    #[error("error in interaction with tool host at {addr}: {source}")]
    Interaction {
        /// `host:port` of the tool host.
        addr: String,
        /// What went wrong.
        #[source]
        source: InteractionError,
    },
    /// Something already answers on the requested address.
    #[error("cannot spawn tool host: {addr} already occupied")]
    AlreadyOccupied {
        /// `host:port` that answered the liveness check.
        addr: String,
    },
    /// The server binary could not be started.
    #[error("failed to spawn tool host '{binary}': {source}")]
    Spawn {
        /// Binary that was executed.
        binary: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The server process exited before it became live.
    #[error("tool host exited with {status} while connecting{}", stderr_suffix(.stderr))]
    ExitedDuringStartup {
        /// Exit status of the child.
        status: ExitStatus,
        /// Trailing text the child wrote to stderr, possibly empty.
        stderr: String,
    },
    /// The child process could not be polled.
    #[error("failed to check tool host process: {source}")]
    Wait {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The server did not become live in time.
    #[error("tool host connection timed out after {}s", .waited.as_secs())]
    StartupTimedOut {
        /// How long the check was retried.
        waited: Duration,
    },
    /// Every candidate port is in use.
    #[error("could not find a free port, try rerunning your command")]
    NoFreePort,
    /// A port check failed for a reason other than a refused connection.
    #[error("failed to check port {port}: {source}")]
    PortCheck {
        /// Port being checked.
        port: u16,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Reasons a single HTTP exchange with the tool host failed.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// The TCP connection could not be established.
    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),
    /// The address is not usable as a `Host` header.
    #[error("invalid host header: {0}")]
    Header(#[from] InvalidHeaderValue),
    /// The HTTP exchange failed.
    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
    /// No complete response arrived in time.
    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),
    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    /// The request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    /// The response body is not a command response.
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
}
