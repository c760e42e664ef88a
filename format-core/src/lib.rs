// SPDX-License-Identifier: GPL-3.0-only

//! Removable-disk discovery and the destructive format workflow
//!
//! - [`DiskClassifier`] turns raw OS disk records into removable-only
//!   [`DiskDescriptor`](format_types::DiskDescriptor)s.
//! - [`FormatOrchestrator`] runs the five [`FormatStep`]s against one
//!   descriptor, stopping at the first failure.
//! - [`translate`] maps raw failure text to a [`FailureCategory`].
//!
//! Every orchestrator run ends with a job log file on disk, whatever the
//! outcome.

pub mod classifier;
pub mod error;
pub mod gate;
pub mod job;
pub mod observer;
pub mod orchestrator;
pub mod steps;
pub mod translator;

pub use classifier::{BusSignals, ClassificationSkip, DiskClassifier, parse_disk_index};
pub use error::{DiscoveryError, FormatError};
pub use gate::{RunLock, WorkflowGate, WorkflowGuard};
pub use job::{FormatJob, JobOutcome, job_log_file_name};
pub use observer::{CallbackObserver, ChannelObserver, FormatObserver, NoopObserver};
pub use orchestrator::{FormatOrchestrator, FormatReport, FormatSettings};
pub use steps::FormatStep;
pub use translator::{FailureCategory, translate};
