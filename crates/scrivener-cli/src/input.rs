//! Command inputs read from files or stdin.

use std::fs;
use std::io::Read;

use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Argument value that selects stdin.
const STDIN: &str = "-";

/// Reads all of stdin as text.
pub(crate) fn read_stdin<R: Read>(stdin: &mut R) -> Result<String, AppError> {
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .map_err(|source| AppError::ReadInput {
            origin: String::from("standard input"),
            source,
        })?;
    Ok(text)
}

/// Reads and decodes `source`, which names a file or `-` for stdin.
pub(crate) fn read_json<T, R>(source: &str, stdin: &mut R) -> Result<T, AppError>
where
    T: DeserializeOwned,
    R: Read,
{
    let origin = if source == STDIN {
        String::from("standard input")
    } else {
        source.to_owned()
    };
    let text = if source == STDIN {
        let mut text = String::new();
        stdin.read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(source)
    }
    .map_err(|error| AppError::ReadInput {
        origin: origin.clone(),
        source: error,
    })?;
    serde_json::from_str(&text).map_err(|source| AppError::ParseInput { origin, source })
}
