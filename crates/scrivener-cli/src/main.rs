//! CLI entrypoint for the Scrivener line editor.
//!
//! The binary delegates to [`scrivener_cli::run`], which loads configuration,
//! installs telemetry, parses the command, and prints the engine's result.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    scrivener_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
