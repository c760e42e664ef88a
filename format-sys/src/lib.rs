// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for the removable-media formatter
//!
//! This crate talks to the operating system on behalf of `format-core`:
//! - Spawning external programs and collecting their merged output
//! - Writing and running disk command interpreter scripts
//! - Querying physical disks, serials and volumes through PowerShell/CIM
//!
//! Disk scripts are destructive and need elevated privileges. Nothing in
//! this crate decides *which* disk is safe to target; that is the
//! classifier's job.

pub mod cim;
pub mod diskpart;
pub mod exec;
pub mod program;

pub use cim::CimDeviceQuery;
pub use diskpart::{DiskScript, DiskpartRunner};
pub use exec::ProcessExecutor;
pub use program::resolve_program;
