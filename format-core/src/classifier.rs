// SPDX-License-Identifier: GPL-3.0-only

//! Removable-disk classification
//!
//! A record is accepted only when it looks like removable media AND does
//! not look like an internal bus AND does not report fixed media. Bus type
//! alone is not trusted: some USB bridges report SATA, and some fixed disks
//! report no clean bus signal, so the media type acts as a second veto.

use std::collections::HashSet;
use std::sync::Arc;

use format_contracts::DeviceQueryProvider;
use format_types::{DiskDescriptor, RawDiskRecord, VolumeDetails, manufacturer_from_model};
use tracing::{debug, info};

use crate::error::DiscoveryError;

const PHYSICAL_DRIVE_PREFIX: &str = r"\\.\PHYSICALDRIVE";
const INTERNAL_BUSES: [&str; 4] = ["SCSI", "IDE", "SATA", "RAID"];

/// Bus and media signals derived from one raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSignals {
    pub looks_internal: bool,
    pub looks_usb: bool,
    pub looks_removable_media: bool,
    pub looks_fixed_media: bool,
}

impl BusSignals {
    pub fn from_record(record: &RawDiskRecord) -> Self {
        let interface = record
            .interface_type
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        let media = record
            .media_type
            .as_deref()
            .unwrap_or_default()
            .to_ascii_uppercase();

        let looks_internal = INTERNAL_BUSES.contains(&interface.as_str());
        let looks_usb =
            interface == "USB" || record.pnp_identity.to_ascii_uppercase().contains("USB");
        let looks_removable_media = media.contains("REMOVABLE") || looks_usb;
        let looks_fixed_media = media.contains("FIXED");

        Self {
            looks_internal,
            looks_usb,
            looks_removable_media,
            looks_fixed_media,
        }
    }

    pub fn accepts(&self) -> bool {
        self.looks_removable_media && !self.looks_internal && !self.looks_fixed_media
    }
}

/// Why a record was left out of the results. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSkip {
    NotRemovable,
    InternalBus,
    FixedMedia,
    NoDiskIndex,
    ZeroSize,
}

/// Disk index from a `\\.\PHYSICALDRIVE<N>` handle.
pub fn parse_disk_index(handle: &str) -> Option<u32> {
    let prefix = handle.get(..PHYSICAL_DRIVE_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PHYSICAL_DRIVE_PREFIX) {
        return None;
    }

    let digits: String = handle.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Decide whether a record is an eligible removable disk.
///
/// Returns the disk index on acceptance.
pub fn classify(record: &RawDiskRecord) -> Result<u32, ClassificationSkip> {
    let signals = BusSignals::from_record(record);
    if !signals.accepts() {
        return Err(if !signals.looks_removable_media {
            ClassificationSkip::NotRemovable
        } else if signals.looks_internal {
            ClassificationSkip::InternalBus
        } else {
            ClassificationSkip::FixedMedia
        });
    }

    let disk_index =
        parse_disk_index(&record.device_handle).ok_or(ClassificationSkip::NoDiskIndex)?;

    if record.size_bytes == 0 {
        return Err(ClassificationSkip::ZeroSize);
    }

    Ok(disk_index)
}

/// Produces fresh removable-disk descriptors on every call
pub struct DiskClassifier {
    provider: Arc<dyn DeviceQueryProvider>,
}

impl DiskClassifier {
    pub fn new(provider: Arc<dyn DeviceQueryProvider>) -> Self {
        Self { provider }
    }

    /// Removable disks ascending by disk index, deduplicated by
    /// `(serial, disk index)` with the first report winning.
    pub async fn discover_removable_disks(&self) -> Result<Vec<DiskDescriptor>, DiscoveryError> {
        let records = self.provider.list_physical_disks().await?;
        let total = records.len();

        let mut disks = Vec::new();
        for record in records {
            let disk_index = match classify(&record) {
                Ok(index) => index,
                Err(skip) => {
                    debug!(
                        "Skipping {} ({:?}): {:?}",
                        record.device_handle, record.model, skip
                    );
                    continue;
                }
            };

            let serial = self.resolve_serial(&record.device_handle).await;
            let volume = self.resolve_volume(&record.device_handle).await;
            disks.push(build_descriptor(disk_index, record, serial, volume));
        }

        let disks = dedup_and_sort(disks);
        info!(
            "Discovered {} removable disk(s) out of {} physical disk(s)",
            disks.len(),
            total
        );
        Ok(disks)
    }

    async fn resolve_serial(&self, handle: &str) -> Option<String> {
        match self.provider.find_serial_by_handle(handle).await {
            Ok(serial) => serial
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            Err(e) => {
                debug!("Serial lookup degraded for {}: {}", handle, e);
                None
            }
        }
    }

    async fn resolve_volume(&self, handle: &str) -> Option<VolumeDetails> {
        match self.provider.find_volume_by_disk_handle(handle).await {
            Ok(volume) => volume,
            Err(e) => {
                debug!("Volume lookup degraded for {}: {}", handle, e);
                None
            }
        }
    }
}

fn build_descriptor(
    disk_index: u32,
    record: RawDiskRecord,
    serial: Option<String>,
    volume: Option<VolumeDetails>,
) -> DiskDescriptor {
    let volume = volume.unwrap_or_default();
    let display_name = if volume.volume_label.trim().is_empty() {
        record.model.clone()
    } else {
        volume.volume_label.trim().to_string()
    };

    DiskDescriptor {
        disk_index,
        manufacturer: manufacturer_from_model(&record.model),
        model: record.model,
        display_name,
        serial_identity: serial.unwrap_or_default(),
        bus_handle: record.device_handle,
        file_system_label: volume.file_system,
        size_bytes: record.size_bytes,
        is_removable_confirmed: true,
    }
}

fn dedup_and_sort(disks: Vec<DiskDescriptor>) -> Vec<DiskDescriptor> {
    let mut seen = HashSet::new();
    let mut unique: Vec<DiskDescriptor> = disks
        .into_iter()
        .filter(|disk| {
            let (serial, disk_index) = disk.dedup_key();
            seen.insert((serial.to_owned(), disk_index))
        })
        .collect();
    unique.sort_by_key(|disk| disk.disk_index);
    unique
}
