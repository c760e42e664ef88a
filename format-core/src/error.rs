// SPDX-License-Identifier: GPL-3.0-only

use format_contracts::{ExecError, QueryError};
use thiserror::Error;

use crate::steps::FormatStep;

/// Discovery fails only when the primary disk listing fails
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("physical disk listing failed: {0}")]
    Listing(#[from] QueryError),
}

/// A step that could not be carried out at all
///
/// A step that ran and exited non-zero is not a `FormatError`; it is a
/// handled failure of the workflow.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{step} could not run: {source}")]
    Step {
        step: FormatStep,
        #[source]
        source: ExecError,
    },
}
