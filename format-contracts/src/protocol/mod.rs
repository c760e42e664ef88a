// SPDX-License-Identifier: GPL-3.0-only

pub mod errors;
pub mod events;
pub mod output;

pub use errors::{ExecError, QueryError};
pub use events::FormatEvent;
pub use output::CommandOutput;
