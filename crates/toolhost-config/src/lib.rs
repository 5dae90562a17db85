//! Configuration shared by the tool host binaries.
//!
//! The server takes its listening port as a required positional argument and
//! everything else from optional flags, each of which may also be supplied via
//! a `TOOLHOST_*` environment variable. A missing or non-numeric port is a
//! usage error reported by [`clap`], which callers surface by exiting.

use std::ffi::OsString;

use clap::Parser;

mod defaults;
mod logging;
mod table;

pub use defaults::{
    DEFAULT_BIND_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_PROGRAM_NAME,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use table::{CommandTableVersion, CommandTableVersionParseError};

/// Resolved configuration for one server process.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "toolhostd",
    version,
    about = "Serve command-line tool entry points over local HTTP"
)]
pub struct Config {
    /// TCP port to listen on.
    #[arg(value_name = "PORT")]
    pub port: u16,

    /// Host or address to bind.
    #[arg(long, env = "TOOLHOST_BIND_HOST", default_value = DEFAULT_BIND_HOST)]
    pub bind_host: String,

    /// Tracing filter directive, for example `info` or `toolhostd=debug`.
    #[arg(long, env = "TOOLHOST_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format: `json` or `compact`.
    #[arg(long, env = "TOOLHOST_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Command table to expose: `v1`, `v2` or `v3`.
    #[arg(long, env = "TOOLHOST_COMMAND_TABLE", default_value_t = CommandTableVersion::V3)]
    pub command_table: CommandTableVersion,

    /// Largest accepted request body in bytes.
    #[arg(long, env = "TOOLHOST_MAX_REQUEST_BYTES", default_value_t = DEFAULT_MAX_REQUEST_BYTES)]
    pub max_request_bytes: usize,

    /// First element of the argument vector handed to forwarded tools.
    #[arg(skip)]
    pub program_name: String,
}

impl Config {
    /// Builds a configuration for `port` with every other setting defaulted.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            bind_host: DEFAULT_BIND_HOST.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            command_table: CommandTableVersion::default(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            program_name: DEFAULT_PROGRAM_NAME.to_owned(),
        }
    }

    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the [`clap::Error`] describing a usage problem, including a
    /// missing or non-numeric port.
    pub fn load() -> Result<Self, clap::Error> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument iterator.
    ///
    /// The first element is treated as the program name, as for a real
    /// process argument vector.
    ///
    /// # Errors
    ///
    /// Returns the [`clap::Error`] describing a usage problem.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let program_name = args
            .first()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_owned());
        let mut config = Self::try_parse_from(args)?;
        config.program_name = program_name;
        Ok(config)
    }

    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// `host:port` pair the server binds.
    #[must_use]
    pub fn bind_address(&self) -> (&str, u16) {
        (self.bind_host.as_str(), self.port)
    }
}
