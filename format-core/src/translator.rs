// SPDX-License-Identifier: GPL-3.0-only

//! Raw failure text → user-facing category
//!
//! Best-effort substring heuristics over interpreter output. The checks run
//! in a fixed priority order; the first hit wins and anything unmatched is
//! `Generic`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    WriteProtected,
    AccessDenied,
    NoMedia,
    IoError,
    Generic,
}

const RULES: [(FailureCategory, &[&str]); 4] = [
    (
        FailureCategory::WriteProtected,
        &["write protected", "write-protected", "schreibgeschützt"],
    ),
    (
        FailureCategory::AccessDenied,
        &["access is denied", "access denied", "zugriff verweigert"],
    ),
    (FailureCategory::NoMedia, &["no media", "keine medien"]),
    (FailureCategory::IoError, &["i/o", "data error", "datenfehler"]),
];

impl FailureCategory {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::WriteProtected => {
                "The medium is write-protected. Check the physical lock switch on the device and try again."
            }
            Self::AccessDenied => {
                "Access denied. Close any open files or Explorer windows on the device and try again."
            }
            Self::NoMedia => "No medium detected. Reinsert the stick or SD card and try again.",
            Self::IoError => "Read/write error. The medium may be defective; try another device.",
            Self::Generic => "The operation failed. Try again or use another medium.",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

pub fn translate(raw: &str) -> FailureCategory {
    let raw = raw.to_lowercase();
    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| raw.contains(needle)))
        .map(|(category, _)| *category)
        .unwrap_or(FailureCategory::Generic)
}
