//! The `toolhost` command-line client.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::client::ProxyClient;
use crate::errors::ClientError;

#[derive(Debug, Parser)]
#[command(name = "toolhost", version, about = "Run commands on a tool host")]
struct Cli {
    /// Tool host address.
    #[arg(long, env = "TOOLHOST_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Tool host port.
    #[arg(long, env = "TOOLHOST_PORT")]
    port: u16,
    /// Request timeout in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    timeout: u64,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Check whether the tool host answers.
    Ping,
    /// Run a command and relay its output and status.
    #[command(disable_help_flag = true)]
    Exec {
        /// Registered command name.
        command: String,
        /// Arguments forwarded verbatim.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Parses `args`, talks to the tool host and relays the outcome.
///
/// For `exec`, the remote stdout and stderr are written to `stdout` and
/// `stderr` and the remote status becomes the exit code; statuses outside
/// `0..=255` map to 1.
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            let _ = writeln!(stderr, "toolhost: failed to build async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(execute(cli, stdout, stderr))
}

async fn execute<W, E>(cli: Cli, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    let client =
        ProxyClient::new(&cli.host, cli.port).with_timeout(Duration::from_secs(cli.timeout));
    match cli.command {
        CliCommand::Ping => {
            if client.is_alive().await {
                let _ = writeln!(stdout, "{} is alive", client.url());
                ExitCode::SUCCESS
            } else {
                let _ = writeln!(stderr, "toolhost: {} is not responding", client.url());
                ExitCode::FAILURE
            }
        }
        CliCommand::Exec { command, args } => match client.execute(&command, args).await {
            Ok(response) => {
                let _ = stdout.write_all(response.stdout.as_bytes());
                let _ = stderr.write_all(response.stderr.as_bytes());
                ExitCode::from(exit_byte(response.status_code))
            }
            Err(error) => report_error(&error, stderr),
        },
    }
}

fn exit_byte(status: i32) -> u8 {
    u8::try_from(status).unwrap_or(1)
}

fn report_usage<W, E>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    let rendered = error.render().to_string();
    if error.use_stderr() {
        let _ = stderr.write_all(rendered.as_bytes());
    } else {
        let _ = stdout.write_all(rendered.as_bytes());
    }
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2))
}

fn report_error<E: Write>(error: &ClientError, stderr: &mut E) -> ExitCode {
    let _ = writeln!(stderr, "toolhost: {error}");
    ExitCode::FAILURE
}
