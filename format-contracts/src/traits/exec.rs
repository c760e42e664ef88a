// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use async_trait::async_trait;

use crate::{CommandOutput, ExecError};

/// Runs one external program per call and captures its merged output.
///
/// A non-zero exit status is reported through `CommandOutput::exit_code`,
/// not as an error. `Err` means the program never ran (or its output could
/// not be collected).
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput, ExecError>;
}
