//! Where preferences live. An explicit directory wins, then the platform
//! config directory, then the directory next to the executable.

use std::path::{Path, PathBuf};

/// Directory containing the running executable. Falls back to current directory if unavailable.
pub fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

pub fn config_directory(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    directories::ProjectDirs::from("", "", "Mangaview")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(exe_directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(config_directory(Some(dir.path())), dir.path());
    }

    #[test]
    fn exe_directory_holds_test_binary() {
        let exe = std::env::current_exe().unwrap();
        assert_eq!(exe.parent().unwrap(), exe_directory());
    }
}
