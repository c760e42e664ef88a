// SPDX-License-Identifier: GPL-3.0-only

pub mod exec;
pub mod query;

pub use exec::CommandExecutor;
pub use query::DeviceQueryProvider;
