//! Request dispatch for the tool host.
//!
//! A request body is decoded into a [`toolhost_types::CommandRequest`], its
//! command is resolved against the [`crate::registry::CommandRegistry`], and
//! the handler runs with a fresh [`crate::capture::OutputCapture`]. The
//! captured streams and the handler's status form the
//! [`toolhost_types::CommandResponse`].

mod dispatcher;
mod errors;
mod request;
mod response;

pub use self::dispatcher::Dispatcher;
pub use self::errors::DispatchError;
pub use self::request::parse_request;
pub use self::response::{assemble, error_response};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
