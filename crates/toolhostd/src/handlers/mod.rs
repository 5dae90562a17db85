//! Operation handlers: adapters between the dispatcher and wrapped tools.
//!
//! Every registered command resolves to one [`OperationHandler`]. Handlers
//! take the request's arguments and an [`OutputCapture`] and always produce a
//! status code; tool failures are rendered into the capture's stderr and never
//! escape the handler.
//!
//! Most commands forward to a tool entry point that parses its own argument
//! vector. [`MainHandler`] and [`AsyncMainHandler`] build that vector as
//! `[program-name, *args]` and pass it explicitly, so no process-wide state is
//! touched while a command runs.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::capture::OutputCapture;
use crate::tools::ArtifactError;

mod derived;

pub use self::derived::{DerivedValue, DerivedValueHandler};

/// Adapter invoked for one registered command.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Runs the command with `args`, writing its output into `capture`.
    ///
    /// Returns zero on success and a non-zero status on failure.
    async fn handle(&self, args: Vec<String>, capture: &mut OutputCapture) -> i32;
}

/// Argument vector handed to a tool entry point.
///
/// The first element is the program name; the rest are the request arguments
/// in their original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector {
    program: String,
    args: Vec<String>,
}

impl ArgumentVector {
    /// Builds `[program, *args]`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The program name in position zero.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments following the program name.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Iterates over the full vector, program name first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// Number of elements including the program name.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len() + 1
    }

    /// Always `false`: the program name is always present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Failures reported by tool entry points.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool rejected its command line, or help/version was requested.
    #[error(transparent)]
    Usage(#[from] clap::Error),
    /// An artifact could not be loaded or hashed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// An output file could not be written.
    #[error("failed to write '{path}': {source}")]
    WriteFile {
        /// Destination path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// An input could not be encoded or decoded.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    /// Writing to the captured streams failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    /// The arguments do not fit the handler's calling convention.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// Description of the problem.
        message: String,
    },
}

impl ToolError {
    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }
}

/// Synchronous tool entry point that reads its own argument vector.
pub trait ToolMain: Send + Sync {
    /// Runs the tool. `Ok` carries the status the tool reports.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the tool fails.
    fn run(&self, argv: &ArgumentVector, capture: &mut OutputCapture) -> Result<i32, ToolError>;
}

/// Asynchronous tool entry point that reads its own argument vector.
#[async_trait]
pub trait AsyncToolMain: Send + Sync {
    /// Runs the tool. `Ok` carries the status the tool reports.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the tool fails.
    async fn run(
        &self,
        argv: &ArgumentVector,
        capture: &mut OutputCapture,
    ) -> Result<i32, ToolError>;
}

/// Forwards a command to a synchronous [`ToolMain`].
#[derive(Debug)]
pub struct MainHandler<T> {
    program_name: Arc<str>,
    tool: T,
}

impl<T> MainHandler<T> {
    /// Wraps `tool`, presenting `program_name` as argv zero.
    pub fn new(program_name: Arc<str>, tool: T) -> Self {
        Self { program_name, tool }
    }
}

#[async_trait]
impl<T> OperationHandler for MainHandler<T>
where
    T: ToolMain,
{
    async fn handle(&self, args: Vec<String>, capture: &mut OutputCapture) -> i32 {
        let argv = ArgumentVector::new(self.program_name.as_ref(), args);
        let outcome = self.tool.run(&argv, capture);
        settle(outcome, capture)
    }
}

/// Forwards a command to an [`AsyncToolMain`].
#[derive(Debug)]
pub struct AsyncMainHandler<T> {
    program_name: Arc<str>,
    tool: T,
}

impl<T> AsyncMainHandler<T> {
    /// Wraps `tool`, presenting `program_name` as argv zero.
    pub fn new(program_name: Arc<str>, tool: T) -> Self {
        Self { program_name, tool }
    }
}

#[async_trait]
impl<T> OperationHandler for AsyncMainHandler<T>
where
    T: AsyncToolMain,
{
    async fn handle(&self, args: Vec<String>, capture: &mut OutputCapture) -> i32 {
        let argv = ArgumentVector::new(self.program_name.as_ref(), args);
        let outcome = self.tool.run(&argv, capture).await;
        settle(outcome, capture)
    }
}

/// Converts a tool outcome into a status, rendering failures into `capture`.
///
/// Help and version requests print to stdout and succeed. Every other error
/// is written to stderr and yields status 1.
pub(crate) fn settle(outcome: Result<i32, ToolError>, capture: &mut OutputCapture) -> i32 {
    match outcome {
        Ok(status) => status,
        Err(ToolError::Usage(error)) => render_usage(&error, capture),
        Err(error) => {
            capture.report_error(&error);
            1
        }
    }
}

fn render_usage(error: &clap::Error, capture: &mut OutputCapture) -> i32 {
    use std::io::Write;

    let rendered = error.render().to_string();
    if error.use_stderr() {
        let _ = capture.stderr().write_all(rendered.as_bytes());
        1
    } else {
        let _ = capture.stdout().write_all(rendered.as_bytes());
        0
    }
}
