// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use crate::ExecError;

/// Exit status and merged stdout/stderr of one finished process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into `ExecError::CommandFailed`.
    pub fn into_result(self, program: &str) -> Result<Self, ExecError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_string(),
                exit_code: self.exit_code,
                output: self.output,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_becomes_command_failed() {
        let ok = CommandOutput::new(0, "done\n");
        assert!(ok.clone().into_result("diskpart.exe").is_ok());

        let err = CommandOutput::new(5, "There is no media in the device.\n")
            .into_result("diskpart.exe")
            .unwrap_err();
        match err {
            ExecError::CommandFailed {
                exit_code, output, ..
            } => {
                assert_eq!(exit_code, 5);
                assert_eq!(output, "There is no media in the device.\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
