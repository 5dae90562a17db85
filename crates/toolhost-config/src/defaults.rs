/// Host the server binds when none is configured: every local interface.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Largest request body accepted by default.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Program name presented to tools when the process argv is empty.
pub const DEFAULT_PROGRAM_NAME: &str = "toolhostd";

/// Log format used when none is configured.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
