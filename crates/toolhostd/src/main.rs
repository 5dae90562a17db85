//! Entry point for the `toolhostd` binary.

use std::io::{self, Write};
use std::process::ExitCode;

use toolhost_config::Config;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };
    match toolhostd::run_server(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "toolhostd: {error}");
            ExitCode::FAILURE
        }
    }
}
