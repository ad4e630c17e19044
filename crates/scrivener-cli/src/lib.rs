//! Command-line runtime for the Scrivener line editor.
//!
//! The runtime splits configuration flags from the command, loads the layered
//! configuration, installs telemetry, and runs the command against an
//! [`EditEngine`](scrivener_edit::EditEngine) or
//! [`FileTools`](scrivener_edit::FileTools) confined to the configured
//! allow-list. Results go to stdout; failures go to stderr with a non-zero
//! exit status.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use scrivener_edit::{DiskStore, EditEngine, FileTools, SystemClock};
use scrivener_sandbox::{AllowList, PathSandbox};
use tracing::debug;

mod cli;
mod commands;
mod config;
mod errors;
mod input;
pub mod telemetry;


use cli::Cli;
use commands::{CommandOutcome, Toolkit, execute};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;

/// Tracing target for CLI events.
const CLI_TARGET: &str = "scrivener_cli";

struct CliRunner<'a, R: Read, W: Write, E: Write, L: ConfigLoader> {
    stdin: &'a mut R,
    stdout: &'a mut W,
    stderr: &'a mut E,
    loader: &'a L,
}

impl<R, W, E, L> CliRunner<'_, R, W, E, L>
where
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error) if is_informational(error.kind()) => {
                return self.emit(&error.to_string(), true);
            }
            Err(error) => return self.fail(&AppError::CliUsage(error)),
        };

        match self.run_command(cli, &split.config_arguments) {
            Ok(outcome) => self.emit(&outcome.message, outcome.success),
            Err(error) => self.fail(&error),
        }
    }

    fn run_command(
        &mut self,
        cli: Cli,
        config_arguments: &[OsString],
    ) -> Result<CommandOutcome, AppError> {
        let config = self.loader.load(config_arguments)?;
        config.validate()?;
        telemetry::initialise(&config)?;
        debug!(
            target: CLI_TARGET,
            allowed_directories = ?config.allowed_directories(),
            "configuration loaded"
        );

        let sandbox = PathSandbox::new(AllowList::from_config(&config));
        let toolkit = Toolkit {
            engine: EditEngine::new(&sandbox, &DiskStore, &SystemClock),
            files: FileTools::new(&sandbox, &DiskStore, &SystemClock)
                .with_read_line_limit(config.file_read_line_limit()),
        };
        execute(cli.command, &toolkit, self.stdin)
    }

    fn emit(&mut self, message: &str, success: bool) -> ExitCode {
        let written = writeln!(self.stdout, "{}", message.trim_end_matches('\n'))
            .and_then(|()| self.stdout.flush());
        match written {
            Ok(()) if success => ExitCode::SUCCESS,
            Ok(()) => ExitCode::FAILURE,
            Err(error) => self.fail(&AppError::WriteOutput(error)),
        }
    }

    fn fail(&mut self, error: &AppError) -> ExitCode {
        let _ = writeln!(self.stderr, "{error}");
        ExitCode::FAILURE
    }
}

const fn is_informational(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// Runs the CLI using the provided arguments and IO handles.
///
/// `stdin` supplies JSON inputs given as `-` and `write-file` content.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdin, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    stdin: &mut R,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner {
        stdin,
        stdout,
        stderr,
        loader,
    }
    .run(args)
}
