//! HTTP transport for the tool host.
//!
//! The listener accepts TCP connections serially and hands each one to hyper
//! with keep-alive disabled, so exactly one request is served per connection.

mod errors;
mod listener;
mod service;

pub use self::errors::ListenerError;
pub use self::listener::HttpListener;
pub use self::service::HttpService;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
