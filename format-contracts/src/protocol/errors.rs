// SPDX-License-Identifier: GPL-3.0-only

use std::io;

use thiserror::Error;

/// Errors from running an external program
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with status {exit_code}")]
    CommandFailed {
        program: String,
        exit_code: i32,
        output: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from the device query provider
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("unparseable query output: {0}")]
    Parse(String),

    #[error("query unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_and_exit_failures_read_differently() {
        let failed = ExecError::CommandFailed {
            program: "diskpart.exe".to_string(),
            exit_code: 1,
            output: "Access is denied.".to_string(),
        };
        assert_eq!(failed.to_string(), "diskpart.exe exited with status 1");

        let launch = ExecError::Launch {
            program: "diskpart.exe".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(launch.to_string().starts_with("failed to launch diskpart.exe"));
    }
}
