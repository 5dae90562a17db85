//! Caller side of the tool host.
//!
//! [`ProxyClient`] posts command requests to a running server and checks its
//! liveness. [`ProxyServer`] spawns a server binary on a chosen port and waits
//! until it answers, and [`find_free_port`] picks a port for it. The
//! `toolhost` binary wraps the client in a small command-line interface.

mod cli;
mod client;
mod errors;
mod ports;
mod server;

pub use cli::run;
pub use client::{DEFAULT_REQUEST_TIMEOUT, LIVENESS_TIMEOUT, ProxyClient};
pub use errors::{ClientError, InteractionError};
pub use ports::{CANDIDATE_PORT_STEP, FIRST_CANDIDATE_PORT, find_free_port, first_free_port};
pub use server::{
    DEFAULT_SERVER_BINARY, ProxyServer, SERVER_BINARY_ENV_VAR, STARTUP_POLL_INTERVAL,
    STARTUP_TIMEOUT, STDERR_TAIL_BYTES, resolve_server_binary,
};
pub use toolhost_types::{CommandRequest, CommandResponse};

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");
const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");
