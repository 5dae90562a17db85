//! Per-request HTTP handling.

use std::error::Error as StdError;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use toolhost_types::CommandResponse;
use tracing::{debug, warn};

use super::TRANSPORT_TARGET;
use crate::dispatch::{DispatchError, Dispatcher, error_response};

/// Maps HTTP requests onto the dispatcher.
///
/// `GET` on any path is a liveness check and answers 200 with an empty body.
/// `POST` on any path carries a command request and always answers 200 with
/// a JSON [`CommandResponse`]. Other methods answer 501.
#[derive(Debug, Clone)]
pub struct HttpService {
    dispatcher: Dispatcher,
    max_request_bytes: usize,
}

impl HttpService {
    /// Creates a service that rejects bodies over `max_request_bytes`.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher, max_request_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_request_bytes,
        }
    }

    /// Produces the response for one request.
    pub async fn respond<B>(&self, request: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let method = request.method().clone();
        match method {
            Method::GET => {
                debug!(
                    target: TRANSPORT_TARGET,
                    path = request.uri().path(),
                    "liveness check"
                );
                empty_response(StatusCode::OK)
            }
            Method::POST => {
                let response = self.command(request.into_body()).await;
                json_response(&response)
            }
            other => {
                debug!(
                    target: TRANSPORT_TARGET,
                    method = %other,
                    "unsupported method"
                );
                empty_response(StatusCode::NOT_IMPLEMENTED)
            }
        }
    }

    async fn command<B>(&self, body: B) -> CommandResponse
    where
        B: Body,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        match read_body(body, self.max_request_bytes).await {
            Ok(bytes) => self.dispatcher.dispatch(&bytes).await,
            Err(error) => {
                warn!(
                    target: TRANSPORT_TARGET,
                    error = %error,
                    "failed to read request body"
                );
                error_response(&error)
            }
        }
    }
}

async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, DispatchError>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(error) if error.downcast_ref::<LengthLimitError>().is_some() => {
            Err(DispatchError::RequestTooLarge { max_size: limit })
        }
        Err(error) => Err(DispatchError::read_body(error)),
    }
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn json_response(body: &CommandResponse) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(encoded) => {
            let mut response = Response::new(Full::new(Bytes::from(encoded)));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(error) => {
            warn!(
                target: TRANSPORT_TARGET,
                error = %error,
                "failed to encode command response"
            );
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::registry::CommandRegistry;

    #[fixture]
    fn service() -> HttpService {
        let dispatcher = Dispatcher::new(Arc::new(CommandRegistry::default()));
        HttpService::new(dispatcher, 64)
    }

    fn request(method: Method, body: &'static str) -> Request<Full<Bytes>> {
        let mut request = Request::new(Full::new(Bytes::from_static(body.as_bytes())));
        *request.method_mut() = method;
        request
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("infallible body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[rstest]
    #[tokio::test]
    async fn get_is_an_empty_ok(service: HttpService) {
        let response = service.respond(request(Method::GET, "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
    }

    #[rstest]
    #[case(Method::PUT)]
    #[case(Method::DELETE)]
    #[case(Method::PATCH)]
    #[tokio::test]
    async fn other_methods_are_not_implemented(service: HttpService, #[case] method: Method) {
        let response = service.respond(request(method, "")).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[rstest]
    #[tokio::test]
    async fn post_answers_json_even_on_failure(service: HttpService) {
        let response = service
            .respond(request(Method::POST, r#"{"command":"nope","args":[]}"#))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            body_text(response).await,
            r#"{"statusCode":1,"stdout":"","stderr":"error: unknown command 'nope'\n"}"#
        );
    }

    #[rstest]
    #[tokio::test]
    async fn oversized_bodies_are_status_one(service: HttpService) {
        let oversized = r#"{"command":"artifact","args":["0123456789012345678901234567890123456789"]}"#;
        let response = service.respond(request(Method::POST, oversized)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let decoded: CommandResponse =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(decoded.status_code, 1);
        assert_eq!(
            decoded.stderr,
            "error: request too large: body exceeds 64 byte limit\n"
        );
    }
}
