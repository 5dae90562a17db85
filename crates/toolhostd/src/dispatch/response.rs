//! Construction of command responses.

use toolhost_types::CommandResponse;

use super::errors::DispatchError;
use crate::capture::{CapturedOutput, OutputCapture};

/// Builds the response for a completed command.
#[must_use]
pub fn assemble(status: i32, output: CapturedOutput) -> CommandResponse {
    CommandResponse::new(status, output.stdout, output.stderr)
}

/// Builds the response for a request that never reached a handler.
///
/// The error is rendered the same way handler failures are: one
/// `error: ...` line on stderr and an empty stdout.
#[must_use]
pub fn error_response(error: &DispatchError) -> CommandResponse {
    let mut capture = OutputCapture::new();
    capture.report_error(error);
    assemble(error.exit_status(), capture.finish())
}
