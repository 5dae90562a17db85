//! Server bootstrap orchestration.
//!
//! Bootstrapping installs telemetry and builds the command registry for the
//! configured table version. Binding the listener is a separate step so the
//! bound address can be reported before any request is accepted.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use toolhost_config::Config;

use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::registry::{CommandRegistry, RegistryError, command_table};
use crate::telemetry::{self, TelemetryError};
use crate::transport::{HttpListener, HttpService, ListenerError};

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The command table could not be assembled.
    #[error("failed to build command table: {source}")]
    Registry {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
    /// The listener could not be bound.
    #[error("failed to start listener: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
}

/// Bootstrapped server, ready to bind.
pub struct Server {
    config: Config,
    registry: Arc<CommandRegistry>,
    reporter: Arc<dyn HealthReporter>,
}

impl Server {
    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Listener`] when the address cannot be bound.
    pub async fn bind(self) -> Result<BoundServer, BootstrapError> {
        let (host, port) = self.config.bind_address();
        let listener = match HttpListener::bind(host, port).await {
            Ok(listener) => listener,
            Err(source) => {
                let error = BootstrapError::Listener { source };
                self.reporter.bootstrap_failed(&error);
                return Err(error);
            }
        };
        self.reporter.listening(listener.local_addr());
        let dispatcher = Dispatcher::new(self.registry);
        Ok(BoundServer {
            listener,
            service: HttpService::new(dispatcher, self.config.max_request_bytes),
            reporter: self.reporter,
        })
    }
}

/// Server with a bound listener.
pub struct BoundServer {
    listener: HttpListener,
    service: HttpService,
    reporter: Arc<dyn HealthReporter>,
}

impl BoundServer {
    /// Address the server accepts connections on.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Serves requests until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.listener.serve(self.service, shutdown).await;
        self.reporter.shutdown_complete();
    }
}

/// Bootstraps the server from an already parsed configuration.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when telemetry or the command table cannot
/// be set up. Failures are also passed to `reporter`.
pub fn bootstrap_with(
    config: Config,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Server, BootstrapError> {
    if let Err(source) = telemetry::install(&config) {
        let error = BootstrapError::Telemetry { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }
    reporter.bootstrap_starting();

    let registry = match command_table(config.command_table, &config.program_name) {
        Ok(registry) => registry,
        Err(source) => {
            let error = BootstrapError::Registry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config, &registry);
    Ok(Server {
        config,
        registry: Arc::new(registry),
        reporter,
    })
}
