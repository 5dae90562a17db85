//! Decoding of command request bodies.

use toolhost_types::CommandRequest;

use super::errors::DispatchError;

/// Decodes a request body into a [`CommandRequest`].
///
/// Surrounding whitespace is ignored. Both `command` and `args` must be
/// present; unknown fields are tolerated.
///
/// # Errors
///
/// Returns [`DispatchError::MalformedRequest`] for an empty body or one that
/// does not decode.
pub fn parse_request(body: &[u8]) -> Result<CommandRequest, DispatchError> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() {
        return Err(DispatchError::malformed("empty request body"));
    }
    serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)
}
