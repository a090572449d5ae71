//! File system paths for the console.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the console.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for console runtime files (~/.examdesk)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.examdesk`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".examdesk"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.examdesk).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.examdesk/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the session store path (~/.examdesk/session.json).
    ///
    /// One record per OS user; every console process reads and writes
    /// this same file.
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_dir() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/examdesk-test"));
        assert_eq!(paths.base_dir(), &PathBuf::from("/tmp/examdesk-test"));
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/tmp/examdesk-test/config.json")
        );
        assert_eq!(
            paths.session_file(),
            PathBuf::from("/tmp/examdesk-test/session.json")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_base() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested").join("base"));
        paths.ensure_dirs().unwrap();
        assert!(paths.base_dir().is_dir());
    }
}
