//! HTTP client helpers shared by the behaviour tests.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use toolhost_config::Config;
use toolhost_types::{CommandRequest, CommandResponse};

use crate::bootstrap::BootstrapError;
use crate::capture::OutputCapture;
use crate::handlers::{ArgumentVector, MainHandler, OperationHandler, ToolError, ToolMain};
use crate::health::HealthReporter;
use crate::registry::CommandRegistry;
use crate::test_support::TestServer;

/// Contract definition shipped with the test fixtures.
pub(crate) const DEFINITION: &str = include_str!("../../tests/fixtures/definition.json");

/// Raw HTTP exchange outcome.
pub(crate) struct Exchange {
    pub(crate) status: StatusCode,
    pub(crate) content_type: Option<String>,
    pub(crate) body: String,
}

pub(crate) async fn send(server: &TestServer, method: Method, path: &str, body: &str) -> Exchange {
    let stream = TcpStream::connect(server.addr()).await.expect("connect");
    let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .expect("http1 handshake");
    tokio::spawn(async move {
        let _ = connection.await;
    });

    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, server.addr().to_string())
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_owned())))
        .expect("build request");
    let response = sender.send_request(request).await.expect("send request");
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    Exchange {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
    }
}

pub(crate) async fn execute(server: &TestServer, command: &str, args: &[&str]) -> CommandResponse {
    let request = CommandRequest::new(command, args.iter().copied());
    let body = serde_json::to_string(&request).expect("encode request");
    let exchange = send(server, Method::POST, "/", &body).await;
    assert_eq!(exchange.status, StatusCode::OK);
    serde_json::from_str(&exchange.body).expect("decode response")
}

/// Records every argument vector it receives and echoes it joined by `|`.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingTool {
    pub(crate) seen: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ToolMain for RecordingTool {
    fn run(&self, argv: &ArgumentVector, capture: &mut OutputCapture) -> Result<i32, ToolError> {
        let owned: Vec<String> = argv.iter().map(str::to_owned).collect();
        writeln!(capture.stdout(), "{}", owned.join("|"))?;
        self.seen.lock().expect("lock").push(owned);
        Ok(0)
    }
}

/// Upper-cases each argument onto stdout and exits with status 7.
pub(crate) struct Shout;

#[async_trait]
impl OperationHandler for Shout {
    async fn handle(&self, args: Vec<String>, capture: &mut OutputCapture) -> i32 {
        for arg in &args {
            let _ = writeln!(capture.stdout(), "{}", arg.to_uppercase());
        }
        let _ = writeln!(capture.stderr(), "shouted {}", args.len());
        7
    }
}

/// Panics on every call.
pub(crate) struct Explodes;

#[async_trait]
impl OperationHandler for Explodes {
    async fn handle(&self, _: Vec<String>, _: &mut OutputCapture) -> i32 {
        panic!("exploded");
    }
}

/// Registry of the `record`, `shout` and `explodes` test commands.
pub(crate) fn test_registry(tool: RecordingTool) -> CommandRegistry {
    CommandRegistry::builder()
        .register("record", MainHandler::new(Arc::from("toolhostd"), tool))
        .and_then(|builder| builder.register("shout", Shout))
        .and_then(|builder| builder.register("explodes", Explodes))
        .expect("register test commands")
        .build()
}

/// Lifecycle notifications observed by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    Listening,
    ShutdownComplete,
}

/// Reporter that keeps every lifecycle event in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("lock").clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events.lock().expect("lock").push(event);
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _: &Config, _: &CommandRegistry) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listening(&self, _: SocketAddr) {
        self.record(HealthEvent::Listening);
    }

    fn shutdown_complete(&self) {
        self.record(HealthEvent::ShutdownComplete);
    }
}
