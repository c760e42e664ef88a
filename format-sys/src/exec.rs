// SPDX-License-Identifier: GPL-3.0-only

//! Child process execution with merged stdout/stderr capture

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use format_contracts::{CommandExecutor, CommandOutput, ExecError};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns one OS process per call, without a console window.
///
/// Lines from stdout and stderr are appended to a single buffer in the
/// order they arrive. Bytes that are not valid UTF-8 are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput, ExecError> {
        let program_name = program.display().to_string();
        debug!("Running {} {:?}", program_name, args);

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command.spawn().map_err(|source| ExecError::Launch {
            program: program_name.clone(),
            source,
        })?;

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, tx.clone())));
        }
        drop(tx);

        let mut combined = String::new();
        while let Some(line) = rx.recv().await {
            combined.push_str(&line);
            combined.push('\n');
        }

        let status = child.wait().await?;
        for reader in readers {
            match reader.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Reading output of {} failed: {}", program_name, e),
                Err(e) => warn!("Output reader for {} panicked: {}", program_name, e),
            }
        }

        // Killed by a signal: no code.
        let exit_code = status.code().unwrap_or(-1);
        debug!("{} exited with status {}", program_name, exit_code);

        Ok(CommandOutput::new(exit_code, combined))
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    while let Some(segment) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&segment);
        let line = line.trim_end_matches('\r').to_string();
        if tx.send(line).is_err() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let err = ProcessExecutor::new()
            .run(Path::new("/nonexistent/safe-format-missing-tool"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ExecError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn merges_both_streams_and_reports_exit_code() {
        let output = ProcessExecutor::new()
            .run(
                Path::new("/bin/sh"),
                &[
                    "-c".to_string(),
                    "echo to-stdout; echo to-stderr 1>&2; exit 3".to_string(),
                ],
            )
            .await
            .expect("sh should launch");

        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert!(output.output.contains("to-stdout\n"));
        assert!(output.output.contains("to-stderr\n"));
        assert_eq!(output.output.lines().count(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn keeps_line_order_within_a_stream() {
        let output = ProcessExecutor::new()
            .run(
                Path::new("/bin/sh"),
                &["-c".to_string(), "printf 'one\\r\\ntwo\\nthree'".to_string()],
            )
            .await
            .expect("sh should launch");

        assert!(output.success());
        assert_eq!(output.output, "one\ntwo\nthree\n");
    }
}
