//! Disk data models
//!
//! `RawDiskRecord` and `VolumeDetails` are what the OS query layer reports.
//! `DiskDescriptor` is the validated, removable-only view built from them.

use serde::{Deserialize, Serialize};

use crate::common::decimal_gigabytes;
use crate::filesystem::FileSystemKind;

/// One physical disk as reported by the device query provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawDiskRecord {
    /// Bus/interface type (e.g., "USB", "SCSI", "IDE")
    pub interface_type: Option<String>,

    /// Media type description (e.g., "Removable Media", "Fixed hard disk media")
    pub media_type: Option<String>,

    /// Model string as reported by the device
    pub model: String,

    /// Path-like handle (e.g., `\\.\PHYSICALDRIVE2`)
    pub device_handle: String,

    /// Total size in bytes (0 if the device is not ready)
    pub size_bytes: u64,

    /// Plug-and-play identity string
    pub pnp_identity: String,
}

/// First logical volume found on a disk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeDetails {
    pub file_system: String,
    pub volume_label: String,
}

/// A validated removable disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskDescriptor {
    // === Identity ===
    /// OS disk ordinal used to target every command of a run
    pub disk_index: u32,

    /// Disk model name
    pub model: String,

    /// First word of the model
    pub manufacturer: String,

    /// Volume label if present, else model
    pub display_name: String,

    /// Serial number (empty when the device does not report one)
    pub serial_identity: String,

    /// Opaque OS path for this device
    pub bus_handle: String,

    // === Contents ===
    /// Current filesystem name (empty if unformatted/unknown)
    pub file_system_label: String,

    /// Total size in bytes
    pub size_bytes: u64,

    /// Set only by the classifier after every removable-media check passed
    pub is_removable_confirmed: bool,
}

impl DiskDescriptor {
    /// Filesystem a format run applies to this device.
    pub fn recommended_file_system(&self) -> FileSystemKind {
        FileSystemKind::for_size(self.size_bytes)
    }

    /// Human-readable size, e.g. "16.0 GB"
    pub fn size_display(&self) -> String {
        decimal_gigabytes(self.size_bytes)
    }

    /// Key used to collapse duplicate reports of the same device.
    pub fn dedup_key(&self) -> (&str, u32) {
        (self.serial_identity.as_str(), self.disk_index)
    }
}

pub fn manufacturer_from_model(model: &str) -> String {
    model
        .split_whitespace()
        .next()
        .map(ToString::to_string)
        .unwrap_or_default()
}
