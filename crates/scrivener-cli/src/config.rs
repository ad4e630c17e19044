//! Configuration loading for the CLI.
//!
//! Configuration flags lead the argument list and are handed to
//! `ortho_config`; everything from the first other token onwards belongs to
//! the command parser.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use scrivener_config::Config;

use crate::errors::AppError;

/// Flags understood by the configuration loader.
///
/// Keep in step with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--allowed-directories",
    "--log-filter",
    "--log-format",
    "--file-read-line-limit",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the leading configuration arguments.
    ///
    /// `args` starts with the program name, as `ortho_config` expects.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loads every configuration layer through `ortho_config`.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments divided between the loader and the command parser.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the configuration flags and their values.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by the command and its arguments.
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(argument) = remaining.next_if(|argument| classify(argument) != FlagAction::Stop)
    {
        config_arguments.push(argument.clone());
        if classify(argument) == (FlagAction::Include { needs_value: true }) {
            if let Some(value) = remaining.next() {
                config_arguments.push(value.clone());
            }
        }
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(remaining.cloned());
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
