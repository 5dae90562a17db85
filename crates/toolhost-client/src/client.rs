//! HTTP client for a running tool host.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, HOST, HeaderValue};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use toolhost_types::{CommandRequest, CommandResponse};
use tracing::debug;

use crate::CLIENT_TARGET;
use crate::errors::{ClientError, InteractionError};

/// Time allowed for a command round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Time allowed for a liveness check.
pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(1);

/// Client bound to one tool host address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyClient {
    addr: String,
    timeout: Duration,
}

impl ProxyClient {
    /// Creates a client for `host:port` with the default request timeout.
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replaces the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port` this client talks to.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Base URL of the tool host.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns `true` when the tool host answers a `GET` with a success
    /// status within [`LIVENESS_TIMEOUT`].
    pub async fn is_alive(&self) -> bool {
        match self.exchange(Method::GET, Bytes::new(), LIVENESS_TIMEOUT).await {
            Ok((status, _)) => status.is_success(),
            Err(error) => {
                debug!(
                    target: CLIENT_TARGET,
                    addr = %self.addr,
                    error = %error,
                    "liveness check failed"
                );
                false
            }
        }
    }

    /// Runs `command` with `args` on the tool host.
    ///
    /// A command that fails still yields `Ok`; inspect
    /// [`CommandResponse::status_code`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Interaction`] when the exchange itself fails.
    pub async fn execute<I, S>(&self, command: &str, args: I) -> Result<CommandResponse, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = CommandRequest::new(command, args);
        let body = serde_json::to_vec(&request)
            .map_err(|error| self.interaction(InteractionError::Encode(error)))?;
        let (status, bytes) = self
            .exchange(Method::POST, Bytes::from(body), self.timeout)
            .await
            .map_err(|error| self.interaction(error))?;
        if status != StatusCode::OK {
            return Err(self.interaction(InteractionError::Status(status)));
        }
        serde_json::from_slice(&bytes)
            .map_err(|error| self.interaction(InteractionError::Decode(error)))
    }

    fn interaction(&self, source: InteractionError) -> ClientError {
        ClientError::Interaction {
            addr: self.addr.clone(),
            source,
        }
    }

    async fn exchange(
        &self,
        method: Method,
        body: Bytes,
        timeout: Duration,
    ) -> Result<(StatusCode, Bytes), InteractionError> {
        tokio::time::timeout(timeout, self.send(method, body))
            .await
            .map_err(|_| InteractionError::Timeout(timeout))?
    }

    async fn send(&self, method: Method, body: Bytes) -> Result<(StatusCode, Bytes), InteractionError> {
        let stream = TcpStream::connect(self.addr.as_str())
            .await
            .map_err(InteractionError::Connect)?;
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                debug!(target: CLIENT_TARGET, error = %error, "connection closed with error");
            }
        });

        let mut request = Request::new(Full::new(body));
        *request.method_mut() = method;
        let headers = request.headers_mut();
        headers.insert(HOST, HeaderValue::from_str(&self.addr)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = sender.send_request(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, bytes))
    }
}
