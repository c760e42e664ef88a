// SPDX-License-Identifier: GPL-3.0-only

//! Per-run state and the job log artifact

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use format_types::{DiskDescriptor, FileSystemKind};
use tracing::{error, info, warn};

use crate::observer::FormatObserver;
use crate::steps::FormatStep;
use crate::translator::FailureCategory;

/// `SafeFormatter_<YYYYMMDD_HHMMSS>_Disk<N>.log`
pub fn job_log_file_name<Tz>(at: DateTime<Tz>, disk_index: u32) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "SafeFormatter_{}_Disk{}.log",
        at.format("%Y%m%d_%H%M%S"),
        disk_index
    )
}

/// `mm:ss`, minutes not wrapped at the hour.
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed {
        step: FormatStep,
        category: FailureCategory,
    },
}

/// Ephemeral state of one format run
///
/// Created when the run starts and dropped when it returns; never reused.
#[derive(Debug)]
pub struct FormatJob {
    disk: DiskDescriptor,
    label: Option<String>,
    file_system: FileSystemKind,
    log: String,
    current_step: Option<FormatStep>,
    completed_steps: usize,
    outcome: Option<JobOutcome>,
    started: Instant,
    log_path: PathBuf,
}

impl FormatJob {
    pub fn new(disk: DiskDescriptor, label: Option<&str>, report_dir: &Path) -> Self {
        let file_system = disk.recommended_file_system();
        let label = label.and_then(|label| file_system.sanitize_label(label));
        let log_path = report_dir.join(job_log_file_name(Local::now(), disk.disk_index));

        Self {
            disk,
            label,
            file_system,
            log: String::new(),
            current_step: None,
            completed_steps: 0,
            outcome: None,
            started: Instant::now(),
            log_path,
        }
    }

    pub fn disk(&self) -> &DiskDescriptor {
        &self.disk
    }

    /// Sanitized volume label, if any survived sanitation.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn file_system(&self) -> FileSystemKind {
        self.file_system
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn current_step(&self) -> Option<FormatStep> {
        self.current_step
    }

    pub fn completed_steps(&self) -> usize {
        self.completed_steps
    }

    pub fn outcome(&self) -> Option<JobOutcome> {
        self.outcome
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Completed steps / total steps.
    pub fn progress(&self) -> f64 {
        self.completed_steps as f64 / FormatStep::COUNT as f64
    }

    pub(crate) fn record(&mut self, observer: &dyn FormatObserver, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
        observer.on_log(line);
    }

    pub(crate) fn begin_step(&mut self, step: FormatStep) {
        self.current_step = Some(step);
    }

    /// Count the current step as done and report the new progress.
    pub(crate) fn finish_step(&mut self, observer: &dyn FormatObserver) {
        self.completed_steps += 1;
        observer.on_progress(self.progress());
    }

    pub(crate) fn set_outcome(&mut self, outcome: JobOutcome) {
        self.outcome = Some(outcome);
    }

    /// Write the log to its timestamped path, falling back to the temp
    /// directory. Returns the path actually used.
    pub(crate) async fn persist(&mut self) -> PathBuf {
        match write_atomically(&self.log_path, &self.log).await {
            Ok(()) => info!("Job log written to {:?}", self.log_path),
            Err(e) => {
                warn!("Could not write job log {:?}: {}", self.log_path, e);
                let file_name = self
                    .log_path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("SafeFormatter.log"));
                let fallback = std::env::temp_dir().join(file_name);
                match write_atomically(&fallback, &self.log).await {
                    Ok(()) => {
                        info!("Job log written to fallback {:?}", fallback);
                        self.log_path = fallback;
                    }
                    Err(e) => error!("Could not write job log anywhere: {}", e),
                }
            }
        }
        self.log_path.clone()
    }
}

async fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = path.with_extension("log.partial");
    tokio::fs::write(&partial, contents).await?;
    tokio::fs::rename(&partial, path).await
}
