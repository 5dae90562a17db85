//! End-to-end behaviour of the server over real loopback connections.

mod lifecycle;
mod support;
mod tool_behaviour;
