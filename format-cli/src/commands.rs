// SPDX-License-Identifier: GPL-3.0-only

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use format_contracts::{CommandExecutor, FormatEvent};
use format_core::{
    ChannelObserver, DiskClassifier, FormatOrchestrator, FormatSettings, RunLock,
};
use format_sys::{CimDeviceQuery, ProcessExecutor, resolve_program};
use format_types::{DiskDescriptor, FileSystemKind, bytes_to_pretty};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::Config;

#[derive(Debug, Serialize)]
struct DiskListing<'a> {
    #[serde(flatten)]
    disk: &'a DiskDescriptor,
    size: String,
    recommended_file_system: FileSystemKind,
}

impl<'a> DiskListing<'a> {
    fn new(disk: &'a DiskDescriptor) -> Self {
        Self {
            disk,
            size: disk.size_display(),
            recommended_file_system: disk.recommended_file_system(),
        }
    }
}

fn executor() -> Arc<dyn CommandExecutor> {
    Arc::new(ProcessExecutor::new())
}

async fn discover(config: &Config, executor: Arc<dyn CommandExecutor>) -> Result<Vec<DiskDescriptor>> {
    let provider = CimDeviceQuery::new(executor, resolve_program(&config.powershell));
    DiskClassifier::new(Arc::new(provider))
        .discover_removable_disks()
        .await
        .context("could not list removable disks")
}

fn table_row(disk: &DiskDescriptor) -> String {
    let current = if disk.file_system_label.is_empty() {
        "-"
    } else {
        disk.file_system_label.as_str()
    };
    format!(
        "{:>4}  {:>9}  {:<8}  {:<6}  {}",
        disk.disk_index,
        disk.size_display(),
        current,
        disk.recommended_file_system(),
        disk.display_name
    )
}

pub async fn list(config: &Config, json: bool) -> Result<()> {
    let disks = discover(config, executor()).await?;

    if json {
        let listings: Vec<_> = disks.iter().map(DiskListing::new).collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if disks.is_empty() {
        println!("No removable USB/SD media found.");
        return Ok(());
    }

    println!("{:>4}  {:>9}  {:<8}  {:<6}  NAME", "DISK", "SIZE", "CURRENT", "TARGET");
    for disk in &disks {
        println!("{}", table_row(disk));
    }
    Ok(())
}

/// The typed confirmation must be exactly the disk index.
fn confirmation_matches(input: &str, disk_index: u32) -> bool {
    input.trim().parse::<u32>() == Ok(disk_index)
}

async fn confirm(disk: &DiskDescriptor) -> Result<bool> {
    println!(
        "ALL DATA on disk {} will be destroyed: {} ({}, {})",
        disk.disk_index,
        disk.display_name,
        disk.size_display(),
        bytes_to_pretty(&disk.size_bytes, true)
    );
    if !disk.serial_identity.is_empty() {
        println!("Serial: {}", disk.serial_identity);
    }
    print!("Type the disk index ({}) to continue: ", disk.disk_index);
    std::io::stdout().flush()?;

    let line = BufReader::new(tokio::io::stdin())
        .lines()
        .next_line()
        .await
        .context("read confirmation")?
        .unwrap_or_default();
    Ok(confirmation_matches(&line, disk.disk_index))
}

pub async fn format(
    config: &Config,
    disk_index: u32,
    label: Option<&str>,
    yes: bool,
) -> Result<ExitCode> {
    // Held until the run ends, across processes.
    let lock_dir = config.script_dir();
    let Some(_lock) = RunLock::try_acquire(&lock_dir)
        .with_context(|| format!("open run lock in {}", lock_dir.display()))?
    else {
        bail!("another format run is already in progress");
    };

    let executor = executor();
    let disks = discover(config, executor.clone()).await?;
    let Some(disk) = disks.into_iter().find(|disk| disk.disk_index == disk_index) else {
        bail!("disk {disk_index} is not a removable USB/SD device; run `safe-format list`");
    };

    if !yes && !confirm(&disk).await? {
        println!("Aborted, nothing was changed.");
        return Ok(ExitCode::FAILURE);
    }

    let settings = FormatSettings {
        diskpart: resolve_program(&config.diskpart),
        script_dir: config.script_dir(),
        report_dir: config.report_dir(),
    };
    info!("Formatting disk {} with {:?}", disk.disk_index, settings.diskpart);
    let orchestrator = FormatOrchestrator::new(executor, settings);

    let (observer, mut events) = ChannelObserver::new();
    let renderer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                FormatEvent::Log(line) => println!("{line}"),
                FormatEvent::Progress(fraction) => println!("[{:>3.0}%]", fraction * 100.0),
            }
        }
    });

    let report = orchestrator.run_format(&disk, label, &observer).await;
    drop(observer);
    renderer.await.context("progress renderer stopped")?;

    println!();
    println!("{}", report.message);
    println!("Log: {}", report.log_path.display());

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
