// SPDX-License-Identifier: GPL-3.0-only

//! Disk command interpreter scripts
//!
//! Every script starts with `select disk N` so that each invocation targets
//! the disk index resolved at discovery time, never whatever the interpreter
//! had selected before.

use std::path::PathBuf;
use std::sync::Arc;

use format_contracts::{CommandExecutor, CommandOutput, ExecError};
use tracing::{debug, warn};
use uuid::Uuid;

/// A line-oriented script bound to one disk index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskScript {
    disk_index: u32,
    commands: Vec<String>,
}

impl DiskScript {
    pub fn new(disk_index: u32) -> Self {
        Self {
            disk_index,
            commands: Vec::new(),
        }
    }

    pub fn command(mut self, line: impl Into<String>) -> Self {
        self.commands.push(line.into());
        self
    }

    pub fn disk_index(&self) -> u32 {
        self.disk_index
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Script text with CRLF line endings.
    pub fn render(&self) -> String {
        let mut script = format!("select disk {}\r\n", self.disk_index);
        for line in &self.commands {
            script.push_str(line);
            script.push_str("\r\n");
        }
        script
    }
}

/// Runs `DiskScript`s through the interpreter (`<program> /s <script>`).
#[derive(Clone)]
pub struct DiskpartRunner {
    executor: Arc<dyn CommandExecutor>,
    program: PathBuf,
    script_dir: PathBuf,
}

impl DiskpartRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>, program: PathBuf, script_dir: PathBuf) -> Self {
        Self {
            executor,
            program,
            script_dir,
        }
    }

    /// Write the script to a fresh temp file, run it, then remove the file.
    ///
    /// Removal is best-effort; a leftover script file is only logged.
    pub async fn run(&self, script: &DiskScript) -> Result<CommandOutput, ExecError> {
        let path = self
            .script_dir
            .join(format!("diskpart_{}.txt", Uuid::new_v4().simple()));
        let text = script.render();
        if !text.is_ascii() {
            warn!("Disk script for disk {} contains non-ASCII text", script.disk_index);
        }

        tokio::fs::write(&path, text.as_bytes()).await?;
        debug!("Wrote disk script {:?}", path);

        let args = vec!["/s".to_string(), path.display().to_string()];
        let result = self.executor.run(&self.program, &args).await;

        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!("Could not remove disk script {:?}: {}", path, e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<(PathBuf, Vec<String>, String)>>,
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput, ExecError> {
            let script = std::fs::read_to_string(&args[1]).unwrap_or_default();
            self.calls
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec(), script));
            Ok(CommandOutput::new(0, "DiskPart successfully cleaned the disk.\n"))
        }
    }

    #[test]
    fn render_selects_disk_first() {
        let script = DiskScript::new(3)
            .command("attributes disk clear readonly")
            .command("clean all");

        assert_eq!(
            script.render(),
            "select disk 3\r\nattributes disk clear readonly\r\nclean all\r\n"
        );
        assert_eq!(script.commands().len(), 2);
    }

    #[tokio::test]
    async fn run_passes_script_path_and_cleans_up() {
        let executor = Arc::new(RecordingExecutor::default());
        let runner = DiskpartRunner::new(
            executor.clone(),
            PathBuf::from("diskpart.exe"),
            std::env::temp_dir(),
        );

        let output = runner
            .run(&DiskScript::new(2).command("clean all"))
            .await
            .expect("script should run");
        assert!(output.success());

        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (program, args, script) = &calls[0];
        assert_eq!(program, Path::new("diskpart.exe"));
        assert_eq!(args[0], "/s");
        assert!(args[1].contains("diskpart_"));
        assert_eq!(script, "select disk 2\r\nclean all\r\n");
        assert!(!Path::new(&args[1]).exists());
    }

    #[tokio::test]
    async fn unwritable_script_dir_is_an_io_error() {
        let runner = DiskpartRunner::new(
            Arc::new(RecordingExecutor::default()),
            PathBuf::from("diskpart.exe"),
            std::env::temp_dir().join(format!("missing-{}", Uuid::new_v4().simple())),
        );

        let err = runner.run(&DiskScript::new(1)).await.unwrap_err();
        assert!(matches!(err, ExecError::Io(_)));
    }
}
