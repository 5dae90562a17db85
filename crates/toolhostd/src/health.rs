//! Structured health reporting for server lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use toolhost_config::Config;

use crate::bootstrap::BootstrapError;
use crate::registry::CommandRegistry;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked once logging is installed, before the command table is built.
    fn bootstrap_starting(&self);

    /// Invoked after telemetry and the registry are ready.
    fn bootstrap_succeeded(&self, config: &Config, registry: &CommandRegistry);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the listener is bound.
    fn listening(&self, addr: SocketAddr);

    /// Invoked after the accept loop has stopped.
    fn shutdown_complete(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, registry: &CommandRegistry) {
        (**self).bootstrap_succeeded(config, registry);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listening(&self, addr: SocketAddr) {
        (**self).listening(addr);
    }

    fn shutdown_complete(&self) {
        (**self).shutdown_complete();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting tool host bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, registry: &CommandRegistry) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            command_table = %config.command_table,
            commands = ?registry.commands(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "tool host bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "tool host bootstrap failed"
        );
    }

    fn listening(&self, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listening",
            addr = %addr,
            "tool host listening"
        );
    }

    fn shutdown_complete(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_complete",
            "tool host stopped"
        );
    }
}
