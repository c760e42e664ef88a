// SPDX-License-Identifier: GPL-3.0-only

//! Physical disk, serial and volume queries through PowerShell/CIM
//!
//! Each query is one `powershell -Command` invocation that prints compact
//! JSON (or a bare string for serials). `ConvertTo-Json` emits a single
//! object instead of an array when there is only one result, so both shapes
//! are accepted.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use format_contracts::{CommandExecutor, DeviceQueryProvider, QueryError};
use format_types::{RawDiskRecord, VolumeDetails};
use serde::Deserialize;
use tracing::debug;

const UTF8_PREAMBLE: &str = "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; ";

const LIST_DISK_DRIVES: &str = "Get-CimInstance -ClassName Win32_DiskDrive \
    | Select-Object InterfaceType,MediaType,Model,DeviceID,Size,PNPDeviceID \
    | ConvertTo-Json -Compress";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CimDiskDrive {
    interface_type: Option<String>,
    media_type: Option<String>,
    model: Option<String>,
    #[serde(rename = "DeviceID")]
    device_id: Option<String>,
    size: Option<u64>,
    #[serde(rename = "PNPDeviceID")]
    pnp_device_id: Option<String>,
}

impl From<CimDiskDrive> for RawDiskRecord {
    fn from(drive: CimDiskDrive) -> Self {
        Self {
            interface_type: drive.interface_type,
            media_type: drive.media_type,
            model: drive.model.unwrap_or_default(),
            device_handle: drive.device_id.unwrap_or_default(),
            size_bytes: drive.size.unwrap_or(0),
            pnp_identity: drive.pnp_device_id.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CimLogicalDisk {
    file_system: Option<String>,
    volume_name: Option<String>,
}

/// `DeviceQueryProvider` backed by `Get-CimInstance`
pub struct CimDeviceQuery {
    executor: Arc<dyn CommandExecutor>,
    powershell: PathBuf,
}

impl CimDeviceQuery {
    pub fn new(executor: Arc<dyn CommandExecutor>, powershell: PathBuf) -> Self {
        Self {
            executor,
            powershell,
        }
    }

    async fn run_query(&self, script: &str) -> Result<String, QueryError> {
        let args = vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-Command".to_string(),
            format!("{UTF8_PREAMBLE}{script}"),
        ];
        let output = self
            .executor
            .run(&self.powershell, &args)
            .await?
            .into_result(&self.powershell.display().to_string())?;
        Ok(output.output)
    }
}

#[async_trait]
impl DeviceQueryProvider for CimDeviceQuery {
    async fn list_physical_disks(&self) -> Result<Vec<RawDiskRecord>, QueryError> {
        let json = self.run_query(LIST_DISK_DRIVES).await?;
        let records = parse_disk_drives(&json)?;
        debug!("CIM reported {} physical disks", records.len());
        Ok(records)
    }

    async fn find_serial_by_handle(&self, handle: &str) -> Result<Option<String>, QueryError> {
        let script = format!(
            "Get-CimInstance -ClassName Win32_PhysicalMedia \
             | Where-Object {{ $_.Tag -eq {} }} \
             | Select-Object -First 1 -ExpandProperty SerialNumber",
            ps_quote(handle)
        );
        let output = self.run_query(&script).await?;
        Ok(parse_serial(&output))
    }

    async fn find_volume_by_disk_handle(
        &self,
        handle: &str,
    ) -> Result<Option<VolumeDetails>, QueryError> {
        let script = format!(
            "Get-CimInstance -ClassName Win32_DiskDrive \
             | Where-Object {{ $_.DeviceID -eq {} }} \
             | Get-CimAssociatedInstance -ResultClassName Win32_DiskPartition \
             | Get-CimAssociatedInstance -ResultClassName Win32_LogicalDisk \
             | Select-Object -First 1 FileSystem,VolumeName \
             | ConvertTo-Json -Compress",
            ps_quote(handle)
        );
        let json = self.run_query(&script).await?;
        parse_volume(&json)
    }
}

/// Single-quoted PowerShell literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn parse_disk_drives(json: &str) -> Result<Vec<RawDiskRecord>, QueryError> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }

    let drives: OneOrMany<CimDiskDrive> =
        serde_json::from_str(json).map_err(|e| QueryError::Parse(e.to_string()))?;
    Ok(drives.into_vec().into_iter().map(RawDiskRecord::from).collect())
}

fn parse_serial(output: &str) -> Option<String> {
    let serial = output.lines().next().unwrap_or_default().trim();
    if serial.is_empty() {
        None
    } else {
        Some(serial.to_string())
    }
}

fn parse_volume(json: &str) -> Result<Option<VolumeDetails>, QueryError> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(None);
    }

    let disks: OneOrMany<CimLogicalDisk> =
        serde_json::from_str(json).map_err(|e| QueryError::Parse(e.to_string()))?;
    Ok(disks
        .into_vec()
        .into_iter()
        .next()
        .map(|disk| VolumeDetails {
            file_system: disk.file_system.unwrap_or_default(),
            volume_label: disk.volume_name.unwrap_or_default(),
        }))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use format_contracts::{CommandOutput, ExecError};

    use super::*;

    const TWO_DRIVES: &str = r#"[{"InterfaceType":"SCSI","MediaType":"Fixed hard disk media","Model":"Samsung SSD 980 PRO 1TB","DeviceID":"\\\\.\\PHYSICALDRIVE0","Size":1000202273280,"PNPDeviceID":"SCSI\\DISK&VEN_NVME&PROD_SAMSUNG\\5&1234"},{"InterfaceType":"USB","MediaType":"Removable Media","Model":"Kingston DataTraveler 3.0 USB Device","DeviceID":"\\\\.\\PHYSICALDRIVE2","Size":15502147584,"PNPDeviceID":"USBSTOR\\DISK&VEN_KINGSTON\\0019E06B4B2D&0"}]"#;

    struct ScriptedExecutor {
        output: CommandOutput,
        scripts: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        fn new(exit_code: i32, output: &str) -> Self {
            Self {
                output: CommandOutput::new(exit_code, output),
                scripts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn run(&self, _program: &Path, args: &[String]) -> Result<CommandOutput, ExecError> {
            self.scripts
                .lock()
                .unwrap()
                .push(args.last().cloned().unwrap_or_default());
            Ok(self.output.clone())
        }
    }

    #[test]
    fn parses_drive_array() {
        let records = parse_disk_drives(TWO_DRIVES).expect("parse drives");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].interface_type.as_deref(), Some("SCSI"));
        assert_eq!(records[1].device_handle, r"\\.\PHYSICALDRIVE2");
        assert_eq!(records[1].size_bytes, 15_502_147_584);
        assert!(records[1].pnp_identity.starts_with("USBSTOR"));
    }

    #[test]
    fn parses_single_drive_object_with_nulls() {
        let records = parse_disk_drives(
            r#"{"InterfaceType":"USB","MediaType":null,"Model":"SD Card Reader","DeviceID":"\\\\.\\PHYSICALDRIVE1","Size":null,"PNPDeviceID":null}"#,
        )
        .expect("parse single drive");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].media_type, None);
        assert_eq!(records[0].size_bytes, 0);
        assert_eq!(records[0].pnp_identity, "");
    }

    #[test]
    fn empty_output_means_no_drives_and_garbage_is_an_error() {
        assert!(parse_disk_drives("  \r\n").unwrap().is_empty());
        assert!(matches!(
            parse_disk_drives("Get-CimInstance : Access denied"),
            Err(QueryError::Parse(_))
        ));
    }

    #[test]
    fn parses_volume_and_serial() {
        let volume = parse_volume(r#"{"FileSystem":"FAT32","VolumeName":"KINGSTON"}"#)
            .unwrap()
            .expect("volume");
        assert_eq!(volume.file_system, "FAT32");
        assert_eq!(volume.volume_label, "KINGSTON");
        assert_eq!(parse_volume("").unwrap(), None);

        assert_eq!(parse_serial("  0019E06B4B2D  \r\n").as_deref(), Some("0019E06B4B2D"));
        assert_eq!(parse_serial("\r\n"), None);
    }

    #[test]
    fn quotes_handles_for_powershell() {
        assert_eq!(ps_quote(r"\\.\PHYSICALDRIVE2"), r"'\\.\PHYSICALDRIVE2'");
        assert_eq!(ps_quote("it's"), "'it''s'");
    }

    #[tokio::test]
    async fn serial_query_embeds_quoted_handle() {
        let executor = Arc::new(ScriptedExecutor::new(0, "ABC123\n"));
        let query = CimDeviceQuery::new(executor.clone(), PathBuf::from("powershell.exe"));

        let serial = query
            .find_serial_by_handle(r"\\.\PHYSICALDRIVE2")
            .await
            .expect("serial query");
        assert_eq!(serial.as_deref(), Some("ABC123"));

        let scripts = executor.scripts.lock().unwrap();
        assert!(scripts[0].contains(r"$_.Tag -eq '\\.\PHYSICALDRIVE2'"));
        assert!(scripts[0].starts_with(UTF8_PREAMBLE));
    }

    #[tokio::test]
    async fn failed_listing_is_reported() {
        let query = CimDeviceQuery::new(
            Arc::new(ScriptedExecutor::new(1, "Access denied")),
            PathBuf::from("powershell.exe"),
        );

        let err = query.list_physical_disks().await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::Exec(ExecError::CommandFailed { exit_code: 1, .. })
        ));
    }
}
