//! HTTP tool host.
//!
//! The server exposes a fixed table of command-line tool entry points over a
//! local HTTP endpoint. A caller posts `{"command": ..., "args": [...]}` and
//! receives the command's status code together with everything it wrote to
//! stdout and stderr. `GET` on any path is a liveness check.
//!
//! Requests are served one at a time. Each dispatched command gets its own
//! [`OutputCapture`] and an explicit [`ArgumentVector`], so handlers never
//! touch process-wide streams or arguments. Every failure, including an
//! unknown command, an undecodable body or a panicking handler, is reported
//! as a status-coded response rather than a transport error.
//!
//! The command table is versioned; [`toolhost_config::CommandTableVersion`]
//! selects which set of commands a process exposes.

mod bootstrap;
mod capture;
pub mod dispatch;
pub mod handlers;
mod health;
mod process;
pub mod registry;
mod telemetry;
pub mod tools;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bootstrap::{BootstrapError, BoundServer, Server, bootstrap_with};
pub use capture::{CaptureBuffer, CapturedOutput, OutputCapture};
pub use handlers::{ArgumentVector, OperationHandler};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, run_server, run_server_with, shutdown_signal};
pub use telemetry::TelemetryError;

#[cfg(test)]
mod tests;
