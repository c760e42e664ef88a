// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use format_sys::DiskScript;
use format_types::FileSystemKind;

/// The five workflow steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatStep {
    Lock,
    WipeAll,
    CreatePartition,
    Format,
    Finalize,
}

impl FormatStep {
    pub const ALL: [FormatStep; 5] = [
        Self::Lock,
        Self::WipeAll,
        Self::CreatePartition,
        Self::Format,
        Self::Finalize,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// 1-based position in the workflow.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Lock => "Lock device",
            Self::WipeAll => "Erase all data (clean all)",
            Self::CreatePartition => "Create partition",
            Self::Format => "Format filesystem",
            Self::Finalize => "Assign drive letter",
        }
    }

    /// Log line written before the step runs.
    pub fn marker(self) -> String {
        format!("→ {}…", self.title())
    }

    /// Interpreter script for this step, or `None` for the in-process
    /// `Lock` placeholder.
    ///
    /// `label` must already be sanitized for `file_system`. The label is
    /// applied by the format command itself; `Finalize` only lists volumes
    /// afterwards so the result shows up in the job log.
    pub fn script(
        self,
        disk_index: u32,
        file_system: FileSystemKind,
        label: Option<&str>,
    ) -> Option<DiskScript> {
        let script = DiskScript::new(disk_index);
        match self {
            Self::Lock => None,
            Self::WipeAll => Some(
                script
                    .command("attributes disk clear readonly")
                    .command("clean all"),
            ),
            Self::CreatePartition => Some(
                script
                    .command("create partition primary")
                    .command("select partition 1")
                    .command("active"),
            ),
            Self::Format => {
                // No `quick`: full format only.
                let mut format = format!("format fs={}", file_system.script_name());
                if let Some(label) = label {
                    format.push_str(&format!(" label=\"{label}\""));
                }
                Some(script.command("select partition 1").command(format))
            }
            Self::Finalize => {
                let script = script.command("select partition 1").command("assign");
                Some(if label.is_some() {
                    script.command("list volume")
                } else {
                    script
                })
            }
        }
    }
}

impl fmt::Display for FormatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered_and_numbered() {
        let numbers: Vec<usize> = FormatStep::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(FormatStep::COUNT, 5);
        assert!(FormatStep::WipeAll < FormatStep::Format);
    }

    #[test]
    fn lock_runs_no_script() {
        assert!(FormatStep::Lock.script(2, FileSystemKind::Fat32, None).is_none());
    }

    #[test]
    fn wipe_clears_readonly_then_cleans_everything() {
        let script = FormatStep::WipeAll
            .script(2, FileSystemKind::Fat32, None)
            .unwrap();
        assert_eq!(script.disk_index(), 2);
        assert_eq!(script.commands(), ["attributes disk clear readonly", "clean all"]);
    }

    #[test]
    fn format_is_full_and_carries_label() {
        let script = FormatStep::Format
            .script(7, FileSystemKind::ExFat, Some("BACKUP"))
            .unwrap();
        assert_eq!(
            script.commands(),
            ["select partition 1", "format fs=exfat label=\"BACKUP\""]
        );
        assert!(!script.render().contains("quick"));

        let unlabeled = FormatStep::Format
            .script(7, FileSystemKind::Fat32, None)
            .unwrap();
        assert_eq!(unlabeled.commands()[1], "format fs=fat32");
    }

    #[test]
    fn finalize_assigns_a_letter() {
        let script = FormatStep::Finalize
            .script(1, FileSystemKind::Fat32, None)
            .unwrap();
        assert_eq!(script.commands(), ["select partition 1", "assign"]);

        let labeled = FormatStep::Finalize
            .script(1, FileSystemKind::Fat32, Some("DATA"))
            .unwrap();
        assert_eq!(labeled.commands().last().map(String::as_str), Some("list volume"));
    }

    #[test]
    fn display_names_step_number_and_title() {
        assert_eq!(FormatStep::Format.to_string(), "step 4 (Format filesystem)");
        assert_eq!(FormatStep::WipeAll.marker(), "→ Erase all data (clean all)…");
    }
}
