// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line arguments
    InvalidArgs(String),
    /// Descriptor dump file missing, unreadable or not valid JSON
    DumpUnreadable(String),
    /// Descriptor parsing failed
    ParseFailed(String),
    /// The device has no resolvable video chain
    NoChain(String),
    /// General error
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::DumpUnreadable(msg) => write!(f, "Cannot read dump: {}", msg),
            CliError::ParseFailed(msg) => write!(f, "Descriptor parse failed: {}", msg),
            CliError::NoChain(msg) => write!(f, "No video chain: {}", msg),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::InvalidArgs(_) => ExitCode::from(2),
            CliError::DumpUnreadable(_) => ExitCode::from(3),
            CliError::ParseFailed(_) => ExitCode::from(4),
            CliError::NoChain(_) => ExitCode::from(5),
            CliError::General(_) => ExitCode::from(1),
        }
    }
}

impl From<uvcgraph::Error> for CliError {
    fn from(err: uvcgraph::Error) -> Self {
        match err {
            uvcgraph::Error::NoValidChain => CliError::NoChain(err.to_string()),
            _ => CliError::ParseFailed(err.to_string()),
        }
    }
}

/// Helper function to convert result to exit code
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}
