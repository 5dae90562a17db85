//! In-process server harness for tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use toolhost_config::{CommandTableVersion, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_PROGRAM_NAME};

use crate::bootstrap::BootstrapError;
use crate::dispatch::Dispatcher;
use crate::registry::{CommandRegistry, command_table};
use crate::transport::{HttpListener, HttpService, ListenerError};

/// Server bound to an ephemeral loopback port and driven by a spawned task.
///
/// Dropping the harness signals shutdown.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Starts a server exposing the given command table.
    ///
    /// # Errors
    ///
    /// Returns a [`BootstrapError`] when the table cannot be built or the
    /// loopback port cannot be bound.
    pub async fn start(version: CommandTableVersion) -> Result<Self, BootstrapError> {
        let registry = command_table(version, DEFAULT_PROGRAM_NAME)
            .map_err(|source| BootstrapError::Registry { source })?;
        Self::start_with(registry, DEFAULT_MAX_REQUEST_BYTES)
            .await
            .map_err(|source| BootstrapError::Listener { source })
    }

    /// Starts a server over an arbitrary registry.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the loopback port cannot be bound.
    pub async fn start_with(
        registry: CommandRegistry,
        max_request_bytes: usize,
    ) -> Result<Self, ListenerError> {
        let listener = HttpListener::bind("127.0.0.1", 0).await?;
        let addr = listener.local_addr();
        let service = HttpService::new(Dispatcher::new(Arc::new(registry)), max_request_bytes);
        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(listener.serve(service, async move {
            let _ = signal.await;
        }));
        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// Bound loopback address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for HTTP clients.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Signals shutdown and waits for the accept loop to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
