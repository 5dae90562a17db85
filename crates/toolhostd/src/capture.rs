//! Output capture for a single dispatched command.
//!
//! Handlers never write to the process-wide standard streams. Each dispatch
//! allocates a fresh [`OutputCapture`], lends it to the handler, and consumes
//! it afterwards to build the response. Because the capture is owned by the
//! dispatch that created it, two requests can never observe each other's
//! output and nothing needs restoring once the handler returns.

use std::io::{self, Write};

/// Append-only text sink standing in for one standard stream.
#[derive(Debug, Default)]
pub struct CaptureBuffer {
    bytes: Vec<u8>,
}

impl CaptureBuffer {
    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the buffer, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn into_string(self) -> String {
        match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
        }
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stdout and stderr buffers for one in-flight command.
///
/// Write order is preserved within each stream. No ordering is recorded
/// between the two streams.
#[derive(Debug, Default)]
pub struct OutputCapture {
    stdout: CaptureBuffer,
    stderr: CaptureBuffer,
}

/// Text collected by an [`OutputCapture`] once the command has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Everything written to the stdout buffer.
    pub stdout: String,
    /// Everything written to the stderr buffer.
    pub stderr: String,
}

impl OutputCapture {
    /// Creates a capture with both buffers empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink for standard output.
    pub fn stdout(&mut self) -> &mut CaptureBuffer {
        &mut self.stdout
    }

    /// Sink for standard error.
    pub fn stderr(&mut self) -> &mut CaptureBuffer {
        &mut self.stderr
    }

    /// Writes `error: {message}` as a single line on the stderr buffer.
    ///
    /// Writing into memory cannot fail, so the result is not surfaced.
    pub fn report_error(&mut self, message: &impl std::fmt::Display) {
        let _ = writeln!(self.stderr, "error: {message}");
    }

    /// Consumes the capture and returns both streams as text.
    #[must_use]
    pub fn finish(self) -> CapturedOutput {
        CapturedOutput {
            stdout: self.stdout.into_string(),
            stderr: self.stderr.into_string(),
        }
    }
}
