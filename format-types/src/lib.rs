// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the removable-media formatter
//!
//! These types are shared by every layer of the workspace:
//!
//! - **format-sys**: builds `RawDiskRecord` and `VolumeDetails` from OS queries
//! - **format-core**: turns raw records into validated `DiskDescriptor`s and
//!   drives the format workflow against them
//! - **format-cli**: renders descriptors and workflow results
//!
//! Raw records are untrusted provider output. Only `DiskDescriptor` values
//! produced by the classifier are eligible targets for a destructive run.

pub mod common;
pub mod disk;
pub mod filesystem;

pub use common::{bytes_to_pretty, decimal_gigabytes};
pub use disk::{DiskDescriptor, RawDiskRecord, VolumeDetails, manufacturer_from_model};
pub use filesystem::{FAT32_MAX_BYTES, FileSystemKind};
