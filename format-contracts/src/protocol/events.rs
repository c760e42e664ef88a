// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Observable output of a running format workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "payload")]
pub enum FormatEvent {
    /// One line appended to the job log
    Log(String),

    /// Completed steps / total steps, in `0.0..=1.0`
    Progress(f64),
}
