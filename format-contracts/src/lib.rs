// SPDX-License-Identifier: GPL-3.0-only

pub mod protocol;
pub mod traits;

pub use protocol::{CommandOutput, ExecError, FormatEvent, QueryError};
pub use traits::{CommandExecutor, DeviceQueryProvider};
