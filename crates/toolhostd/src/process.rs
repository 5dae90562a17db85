//! Process-level wiring: runtime construction and shutdown signals.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use toolhost_config::Config;

use crate::bootstrap::{BootstrapError, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors surfaced while running the server process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The async runtime could not be built.
    #[error("failed to build async runtime: {source}")]
    Runtime {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Bootstrap failed.
    #[error("tool host bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

/// Runs the server with the default health reporter until a shutdown signal
/// arrives.
///
/// # Errors
///
/// Returns a [`LaunchError`] when the runtime cannot be built or bootstrap
/// fails.
pub fn run_server(config: Config) -> Result<(), LaunchError> {
    run_server_with(config, Arc::new(StructuredHealthReporter::new()))
}

/// Runs the server on a single-threaded runtime using `reporter`.
///
/// # Errors
///
/// Returns a [`LaunchError`] when the runtime cannot be built or bootstrap
/// fails.
pub fn run_server_with(
    config: Config,
    reporter: Arc<dyn HealthReporter>,
) -> Result<(), LaunchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| LaunchError::Runtime { source })?;
    runtime.block_on(async move {
        let server = bootstrap_with(config, reporter)?;
        let bound = server.bind().await?;
        bound.serve(shutdown_signal()).await;
        Ok::<(), LaunchError>(())
    })
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
///
/// A signal source that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(
                target: PROCESS_TARGET,
                error = %error,
                "failed to listen for interrupt signal"
            );
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(
                    target: PROCESS_TARGET,
                    error = %error,
                    "failed to listen for terminate signal"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!(target: PROCESS_TARGET, signal = "SIGINT", "shutdown requested"),
        () = terminate => info!(target: PROCESS_TARGET, signal = "SIGTERM", "shutdown requested"),
    }
}
