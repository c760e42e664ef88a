// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;
use std::sync::Arc;

use format_contracts::CommandExecutor;
use format_sys::DiskpartRunner;
use format_types::DiskDescriptor;
use tracing::{error, info, warn};

use crate::error::FormatError;
use crate::job::{FormatJob, JobOutcome, format_elapsed};
use crate::observer::FormatObserver;
use crate::steps::FormatStep;
use crate::translator::{FailureCategory, translate};

/// Where the workflow finds its interpreter and puts its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSettings {
    /// Disk command interpreter, already resolved.
    pub diskpart: PathBuf,
    /// Directory for the transient per-step script files.
    pub script_dir: PathBuf,
    /// Directory for the per-run job log.
    pub report_dir: PathBuf,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            diskpart: PathBuf::from("diskpart.exe"),
            script_dir: std::env::temp_dir(),
            report_dir: std::env::temp_dir(),
        }
    }
}

/// Result of one `run_format` call; always carries a log file reference
#[derive(Debug, Clone, PartialEq)]
pub struct FormatReport {
    pub success: bool,
    /// Single user-facing summary line.
    pub message: String,
    /// Full job log, including raw interpreter output.
    pub log: String,
    pub log_path: PathBuf,
    pub category: Option<FailureCategory>,
    pub failed_step: Option<FormatStep>,
}

enum StepFailure {
    /// The step ran and the interpreter reported failure.
    Failed { step: FormatStep, output: String },
    /// The step could not run at all.
    Fault(FormatError),
}

/// Runs the destructive five-step workflow against one disk
pub struct FormatOrchestrator {
    runner: DiskpartRunner,
    settings: FormatSettings,
}

impl FormatOrchestrator {
    pub fn new(executor: Arc<dyn CommandExecutor>, settings: FormatSettings) -> Self {
        let runner = DiskpartRunner::new(
            executor,
            settings.diskpart.clone(),
            settings.script_dir.clone(),
        );
        Self { runner, settings }
    }

    /// Erase, partition and format `disk`, stopping at the first failing step.
    ///
    /// Never returns an error: every failure, including a step that could
    /// not be launched, ends in a report with a translated message and a
    /// persisted job log.
    pub async fn run_format(
        &self,
        disk: &DiskDescriptor,
        label: Option<&str>,
        observer: &dyn FormatObserver,
    ) -> FormatReport {
        let mut job = FormatJob::new(disk.clone(), label, &self.settings.report_dir);
        info!(
            "Starting format of disk {} ({}) as {}",
            disk.disk_index,
            disk.model,
            job.file_system()
        );

        let header = format!(
            "Disk {}: {} ({}), target {}",
            disk.disk_index,
            disk.model,
            disk.size_display(),
            job.file_system()
        );
        job.record(observer, &header);
        if let Some(label) = job.label().map(str::to_owned) {
            job.record(observer, &format!("Volume label: {label}"));
        }

        let (message, category, failed_step) = match self.run_steps(&mut job, observer).await {
            Ok(()) => {
                let elapsed = format_elapsed(job.elapsed());
                job.record(observer, &format!("Done in {elapsed}"));
                job.set_outcome(JobOutcome::Succeeded);
                info!("Disk {} formatted in {}", disk.disk_index, elapsed);
                let message = format!(
                    "{} ({}) was formatted successfully as {}.",
                    disk.model,
                    disk.size_display(),
                    job.file_system()
                );
                (message, None, None)
            }
            Err(StepFailure::Failed { step, output }) => {
                let category = translate(&output);
                warn!("Disk {}: {} failed ({:?})", disk.disk_index, step, category);
                job.set_outcome(JobOutcome::Failed { step, category });
                (category.user_message().to_string(), Some(category), Some(step))
            }
            Err(StepFailure::Fault(err)) => {
                let diagnostic = err.to_string();
                error!("Disk {}: {:?}", disk.disk_index, err);
                job.record(observer, &format!("Unexpected error: {diagnostic}"));
                job.record(observer, &format!("{err:?}"));
                let category = translate(&diagnostic);
                let step = match &err {
                    FormatError::Step { step, .. } => *step,
                };
                job.set_outcome(JobOutcome::Failed { step, category });
                (category.user_message().to_string(), Some(category), Some(step))
            }
        };

        let log_path = job.persist().await;

        FormatReport {
            success: job.outcome() == Some(JobOutcome::Succeeded),
            message,
            log: job.log().to_string(),
            log_path,
            category,
            failed_step,
        }
    }

    async fn run_steps(
        &self,
        job: &mut FormatJob,
        observer: &dyn FormatObserver,
    ) -> Result<(), StepFailure> {
        let disk_index = job.disk().disk_index;
        let file_system = job.file_system();

        for step in FormatStep::ALL {
            job.begin_step(step);
            job.record(observer, &step.marker());

            let Some(script) = step.script(disk_index, file_system, job.label()) else {
                job.record(observer, "ready");
                job.finish_step(observer);
                continue;
            };

            let output = self
                .runner
                .run(&script)
                .await
                .map_err(|source| StepFailure::Fault(FormatError::Step { step, source }))?;

            for line in output.output.lines() {
                job.record(observer, line);
            }

            // A failed step leaves progress where it was.
            if !output.success() {
                job.record(observer, &format!("Exit code {}", output.exit_code));
                return Err(StepFailure::Failed {
                    step,
                    output: output.output,
                });
            }
            job.finish_step(observer);
        }

        Ok(())
    }
}
