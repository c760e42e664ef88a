// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use format_types::{RawDiskRecord, VolumeDetails};

use crate::QueryError;

/// OS device/volume enumeration
///
/// Only `list_physical_disks` failing is fatal to discovery. Callers treat
/// errors from the two lookups the same as `Ok(None)`.
#[async_trait]
pub trait DeviceQueryProvider: Send + Sync {
    async fn list_physical_disks(&self) -> Result<Vec<RawDiskRecord>, QueryError>;

    async fn find_serial_by_handle(&self, handle: &str) -> Result<Option<String>, QueryError>;

    async fn find_volume_by_disk_handle(
        &self,
        handle: &str,
    ) -> Result<Option<VolumeDetails>, QueryError>;
}
