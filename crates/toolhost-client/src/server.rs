//! Spawning a tool host process and waiting for it to become live.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::SERVER_TARGET;
use crate::client::ProxyClient;
use crate::errors::ClientError;

/// Environment variable naming the server binary.
pub const SERVER_BINARY_ENV_VAR: &str = "TOOLHOST_SERVER_BIN";

/// Server binary used when nothing else is configured.
pub const DEFAULT_SERVER_BINARY: &str = "toolhostd";

/// Interval between liveness checks during startup.
pub const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Longest time to wait for a spawned server to become live.
pub const STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Trailing bytes of the child's stderr kept for startup diagnostics.
pub const STDERR_TAIL_BYTES: usize = 4096;

const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Picks the server binary: an explicit override, then
/// [`SERVER_BINARY_ENV_VAR`], then [`DEFAULT_SERVER_BINARY`] on `PATH`.
#[must_use]
pub fn resolve_server_binary(override_binary: Option<&Path>) -> PathBuf {
    override_binary.map_or_else(
        || {
            env::var_os(SERVER_BINARY_ENV_VAR)
                .filter(|value| !value.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_SERVER_BINARY), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

/// Tool host child process owned by the caller.
///
/// The child is killed when the handle is stopped or dropped.
#[derive(Debug)]
pub struct ProxyServer {
    child: Child,
    client: ProxyClient,
}

impl ProxyServer {
    /// Spawns `binary` listening on `host:port` and waits until it answers
    /// liveness checks.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyOccupied`] when something already
    /// answers on the address, [`ClientError::ExitedDuringStartup`] when the
    /// child exits first, and [`ClientError::StartupTimedOut`] after
    /// [`STARTUP_TIMEOUT`].
    pub async fn start(binary: &Path, host: &str, port: u16) -> Result<Self, ClientError> {
        Self::start_with(binary, host, port, &[], STARTUP_TIMEOUT).await
    }

    /// Like [`Self::start`], passing `extra_args` to the server and waiting
    /// at most `timeout`.
    ///
    /// # Errors
    ///
    /// See [`Self::start`].
    pub async fn start_with(
        binary: &Path,
        host: &str,
        port: u16,
        extra_args: &[OsString],
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = ProxyClient::new(host, port);
        if client.is_alive().await {
            return Err(ClientError::AlreadyOccupied {
                addr: client.addr().to_owned(),
            });
        }

        let mut child = Command::new(binary)
            .arg(port.to_string())
            .arg("--bind-host")
            .arg(host)
            .args(extra_args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClientError::Spawn {
                binary: binary.to_path_buf(),
                source,
            })?;
        debug!(
            target: SERVER_TARGET,
            binary = %binary.display(),
            addr = client.addr(),
            pid = child.id(),
            "spawned tool host"
        );
        let tail = child.stderr.take().map(StderrTail::spawn);

        let started = Instant::now();
        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|source| ClientError::Wait { source })?
            {
                let stderr = match tail {
                    Some(tail) => tail.finish().await,
                    None => String::new(),
                };
                warn!(
                    target: SERVER_TARGET,
                    status = %status,
                    stderr = %stderr,
                    "tool host exited during startup"
                );
                return Err(ClientError::ExitedDuringStartup { status, stderr });
            }
            if client.is_alive().await {
                info!(
                    target: SERVER_TARGET,
                    addr = client.addr(),
                    "tool host is live"
                );
                return Ok(Self { child, client });
            }
            if started.elapsed() >= timeout {
                let _ = child.kill().await;
                return Err(ClientError::StartupTimedOut { waited: timeout });
            }
            tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
        }
    }

    /// Client for the spawned server.
    #[must_use]
    pub const fn client(&self) -> &ProxyClient {
        &self.client
    }

    /// Kills the child and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Wait`] when the child cannot be reaped.
    pub async fn stop(mut self) -> Result<(), ClientError> {
        self.child
            .kill()
            .await
            .map_err(|source| ClientError::Wait { source })
    }
}

/// Relays a child's stderr to ours while remembering its last bytes.
struct StderrTail {
    buffer: Arc<Mutex<Vec<u8>>>,
    relay: JoinHandle<()>,
}

impl StderrTail {
    fn spawn(stderr: ChildStderr) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let relay = tokio::spawn(relay_stderr(stderr, Arc::clone(&buffer)));
        Self { buffer, relay }
    }

    /// Waits briefly for the stream to close and returns the retained text.
    async fn finish(self) -> String {
        let Self { buffer, relay } = self;
        if tokio::time::timeout(STDERR_DRAIN_TIMEOUT, relay).await.is_err() {
            debug!(target: SERVER_TARGET, "tool host stderr still open after exit");
        }
        let bytes = buffer.lock().unwrap_or_else(PoisonError::into_inner).to_vec();
        String::from_utf8_lossy(&bytes).trim_end().to_owned()
    }
}

async fn relay_stderr(mut stderr: ChildStderr, buffer: Arc<Mutex<Vec<u8>>>) {
    let mut sink = tokio::io::stderr();
    let mut chunk = [0_u8; 1024];
    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) => break,
            Ok(read) => {
                let bytes = chunk.get(..read).unwrap_or_default();
                remember(&buffer, bytes);
                let _ = sink.write_all(bytes).await;
            }
            Err(error) => {
                debug!(target: SERVER_TARGET, error = %error, "stopped reading tool host stderr");
                break;
            }
        }
    }
}

fn remember(buffer: &Mutex<Vec<u8>>, bytes: &[u8]) {
    let mut tail = buffer.lock().unwrap_or_else(PoisonError::into_inner);
    tail.extend_from_slice(bytes);
    let excess = tail.len().saturating_sub(STDERR_TAIL_BYTES);
    tail.drain(..excess);
}
