//! Request dispatcher: decode, resolve, execute, respond.

use std::sync::Arc;

use toolhost_types::{CommandRequest, CommandResponse};
use tracing::{debug, info, warn};

use super::errors::DispatchError;
use super::request::parse_request;
use super::response::{assemble, error_response};
use super::DISPATCH_TARGET;
use crate::capture::OutputCapture;
use crate::registry::CommandRegistry;

/// Turns request bodies into responses using a fixed registry.
///
/// Every outcome is a [`CommandResponse`]: decode failures, unknown commands
/// and handler panics all become status 1 with a diagnostic on stderr.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Decodes `body` and executes the request it describes.
    pub async fn dispatch(&self, body: &[u8]) -> CommandResponse {
        match parse_request(body) {
            Ok(request) => self.execute(request).await,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    error = %error,
                    "rejected request body"
                );
                error_response(&error)
            }
        }
    }

    /// Executes a decoded request with a fresh output capture.
    ///
    /// The handler runs on its own task so a panic is contained and reported
    /// as status 1 instead of tearing down the server.
    pub async fn execute(&self, request: CommandRequest) -> CommandResponse {
        let CommandRequest { command, args } = request;
        let handler = match self.registry.resolve(&command) {
            Ok(handler) => handler,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, command = command.as_str(), "unknown command");
                return error_response(&error);
            }
        };

        debug!(
            target: DISPATCH_TARGET,
            command = command.as_str(),
            arg_count = args.len(),
            "dispatching command"
        );
        let task = tokio::spawn(async move {
            let mut capture = OutputCapture::new();
            let status = handler.handle(args, &mut capture).await;
            (status, capture.finish())
        });

        match task.await {
            Ok((status, output)) => {
                info!(
                    target: DISPATCH_TARGET,
                    command = command.as_str(),
                    status,
                    "command finished"
                );
                assemble(status, output)
            }
            Err(join_error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    command = command.as_str(),
                    error = %join_error,
                    "command handler failed"
                );
                error_response(&DispatchError::handler_panicked(command))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use async_trait::async_trait;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::handlers::OperationHandler;

    struct Echo;

    #[async_trait]
    impl OperationHandler for Echo {
        async fn handle(&self, args: Vec<String>, capture: &mut OutputCapture) -> i32 {
            let _ = writeln!(capture.stdout(), "{}", args.join(" "));
            let _ = writeln!(capture.stderr(), "{} args", args.len());
            i32::try_from(args.len()).unwrap_or(i32::MAX)
        }
    }

    struct Panics;

    #[async_trait]
    impl OperationHandler for Panics {
        async fn handle(&self, _: Vec<String>, capture: &mut OutputCapture) -> i32 {
            let _ = writeln!(capture.stdout(), "partial");
            panic!("handler bug");
        }
    }

    #[fixture]
    fn dispatcher() -> Dispatcher {
        let registry = CommandRegistry::builder()
            .register("echo", Echo)
            .and_then(|builder| builder.register("panics", Panics))
            .expect("register")
            .build();
        Dispatcher::new(Arc::new(registry))
    }

    #[rstest]
    #[tokio::test]
    async fn returns_handler_status_and_streams(dispatcher: Dispatcher) {
        let response = dispatcher
            .dispatch(br#"{"command": "echo", "args": ["a", "b c"]}"#)
            .await;
        assert_eq!(response, CommandResponse::new(2, "a b c\n", "2 args\n"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_commands_are_status_one(dispatcher: Dispatcher) {
        let response = dispatcher
            .dispatch(br#"{"command": "nope", "args": []}"#)
            .await;
        assert_eq!(
            response,
            CommandResponse::new(1, "", "error: unknown command 'nope'\n")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_bodies_are_status_one(dispatcher: Dispatcher) {
        let response = dispatcher.dispatch(b"not json").await;
        assert_eq!(response.status_code, 1);
        assert!(response.stdout.is_empty());
        assert!(response.stderr.starts_with("error: malformed request: "));
    }

    #[rstest]
    #[tokio::test]
    async fn panics_are_contained(dispatcher: Dispatcher) {
        let response = dispatcher
            .execute(CommandRequest::new("panics", Vec::<String>::new()))
            .await;
        assert_eq!(
            response,
            CommandResponse::new(1, "", "error: handler for 'panics' panicked\n")
        );

        let after = dispatcher
            .execute(CommandRequest::new("echo", ["still", "alive"]))
            .await;
        assert_eq!(after.status_code, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn captures_do_not_leak_between_requests(dispatcher: Dispatcher) {
        let first = dispatcher
            .execute(CommandRequest::new("echo", ["first"]))
            .await;
        let second = dispatcher
            .execute(CommandRequest::new("echo", ["second"]))
            .await;
        assert_eq!(first.stdout, "first\n");
        assert_eq!(second.stdout, "second\n");
        assert!(!second.stdout.contains("first"));
    }
}
