// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};

use tracing::debug;
use which::which;

/// Resolve a bare program name on `PATH`.
///
/// Paths with a directory component are returned unchanged. A name that
/// cannot be found is also returned unchanged so the launch error surfaces
/// when the program is actually run.
pub fn resolve_program(program: &Path) -> PathBuf {
    let has_dir = program
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if has_dir {
        return program.to_path_buf();
    }

    match which(program) {
        Ok(path) => {
            debug!("Resolved {:?} to {:?}", program, path);
            path
        }
        Err(e) => {
            debug!("Could not resolve {:?} on PATH: {}", program, e);
            program.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_explicit_paths_and_unknown_names() {
        let explicit = Path::new("/opt/tools/diskpart.exe");
        assert_eq!(resolve_program(explicit), explicit);

        let missing = Path::new("definitely-not-a-real-program-7f3a");
        assert_eq!(resolve_program(missing), missing);
    }
}
