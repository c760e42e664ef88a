// SPDX-License-Identifier: GPL-3.0-only

//! Target filesystems for a format run

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest device (inclusive) that still gets FAT32: 32 GiB.
pub const FAT32_MAX_BYTES: u64 = 32 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileSystemKind {
    #[serde(rename = "FAT32")]
    Fat32,
    #[serde(rename = "exFAT")]
    ExFat,
}

impl FileSystemKind {
    /// Recommended filesystem for a device of `size_bytes`.
    pub fn for_size(size_bytes: u64) -> Self {
        if size_bytes <= FAT32_MAX_BYTES {
            Self::Fat32
        } else {
            Self::ExFat
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fat32 => "FAT32",
            Self::ExFat => "exFAT",
        }
    }

    /// Name accepted by the disk command interpreter's `fs=` option.
    pub fn script_name(self) -> &'static str {
        match self {
            Self::Fat32 => "fat32",
            Self::ExFat => "exfat",
        }
    }

    /// Maximum volume label length in characters.
    pub fn max_label_len(self) -> usize {
        match self {
            Self::Fat32 => 11,
            Self::ExFat => 15,
        }
    }

    /// Characters the filesystem rejects in a volume label.
    pub fn forbidden_label_chars(self) -> &'static [char] {
        match self {
            Self::Fat32 => &[
                '*', '?', '.', ',', ';', ':', '/', '\\', '|', '+', '=', '<', '>', '[', ']',
            ],
            Self::ExFat => &['*', '?', '/', '\\', '|', ':', '<', '>'],
        }
    }

    /// Normalize a user-supplied volume label for this filesystem.
    ///
    /// Keeps printable ASCII except `"` and the characters the filesystem
    /// forbids, so the format command cannot reject the label after the disk
    /// was already wiped. Returns `None` when nothing usable remains.
    pub fn sanitize_label(self, label: &str) -> Option<String> {
        let forbidden = self.forbidden_label_chars();
        let cleaned: String = label
            .trim()
            .chars()
            .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"')
            .filter(|c| !forbidden.contains(c))
            .take(self.max_label_len())
            .collect();
        let cleaned = cleaned.trim_end().to_string();

        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

impl fmt::Display for FileSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_switches_after_32_gib() {
        assert_eq!(FileSystemKind::for_size(1), FileSystemKind::Fat32);
        assert_eq!(FileSystemKind::for_size(16_000_000_000), FileSystemKind::Fat32);
        assert_eq!(
            FileSystemKind::for_size(34_359_738_368),
            FileSystemKind::Fat32
        );
        assert_eq!(
            FileSystemKind::for_size(34_359_738_369),
            FileSystemKind::ExFat
        );
        assert_eq!(FileSystemKind::for_size(u64::MAX), FileSystemKind::ExFat);
    }

    #[test]
    fn labels_are_trimmed_unquoted_and_truncated() {
        assert_eq!(
            FileSystemKind::Fat32.sanitize_label("  \"BACKUP\"  ").as_deref(),
            Some("BACKUP")
        );
        assert_eq!(
            FileSystemKind::Fat32.sanitize_label("HOLIDAY PHOTOS 2024").as_deref(),
            Some("HOLIDAY PHO")
        );
        assert_eq!(
            FileSystemKind::ExFat.sanitize_label("HOLIDAY PHOTOS 2024").as_deref(),
            Some("HOLIDAY PHOTOS")
        );
        assert_eq!(FileSystemKind::ExFat.sanitize_label("   "), None);
        assert_eq!(FileSystemKind::ExFat.sanitize_label("\"\""), None);
        assert_eq!(
            FileSystemKind::Fat32.sanitize_label("Müll\tDisk").as_deref(),
            Some("MllDisk")
        );
    }

    #[test]
    fn labels_drop_characters_the_filesystem_forbids() {
        assert_eq!(
            FileSystemKind::Fat32.sanitize_label("My.Stick:1").as_deref(),
            Some("MyStick1")
        );
        assert_eq!(
            FileSystemKind::Fat32.sanitize_label("a*b?c,d;e/f\\g|h+i=j<k>l[m]n").as_deref(),
            Some("abcdefghijk")
        );
        assert_eq!(FileSystemKind::Fat32.sanitize_label("..."), None);

        // exFAT allows punctuation that FAT32 rejects.
        assert_eq!(
            FileSystemKind::ExFat.sanitize_label("My.Stick+[1]").as_deref(),
            Some("My.Stick+[1]")
        );
        assert_eq!(
            FileSystemKind::ExFat.sanitize_label("A:B/C\\D|E*F?G<H>").as_deref(),
            Some("ABCDEFGH")
        );
    }

    #[test]
    fn serializes_with_display_names() {
        let json = serde_json::to_string(&FileSystemKind::ExFat).unwrap();
        assert_eq!(json, "\"exFAT\"");
    }
}
