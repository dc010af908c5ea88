//! Parameters passed by the host

use std::path::PathBuf;

use thiserror::Error;

/// Separates the entries of a parameter string
pub const PARAMETER_SEPARATOR: char = ';';

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ConfigError {
    #[error("log file was not set")]
    NotSet,

    #[error("too many parameters")]
    TooManyParameters,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Split a parameter string into its non-empty entries
///
/// Leading and trailing whitespace is stripped from every entry.
pub fn split_parameters(parameters: &str) -> impl Iterator<Item = &str> {
    parameters
        .split(PARAMETER_SEPARATOR)
        .map(str::trim)
        .filter(|param| !param.is_empty())
}

/// Extract the path of the log file
///
/// Exactly one parameter is expected. Paths that start or end with
/// whitespace cannot be expressed, the whitespace is always stripped.
pub fn parse_log_file_path(parameters: Option<&str>) -> Result<PathBuf> {
    let mut params = split_parameters(parameters.unwrap_or_default());
    let log_file = params.next().ok_or(ConfigError::NotSet)?;
    if params.next().is_some() {
        return Err(ConfigError::TooManyParameters);
    }
    Ok(PathBuf::from(log_file))
}
