// ABOUTME: WorkingDir - a cheaply cloneable handle over a conversation's
// ABOUTME: mutable working directory, shared between tools.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Shared, mutable working directory for a conversation.
///
/// Tools like `cd` mutate it; other tools read it at call time. Subagent
/// bindings capture the value at allocation time and do not follow later
/// changes.
#[derive(Clone)]
pub struct WorkingDir {
    path: Arc<RwLock<PathBuf>>,
}

impl WorkingDir {
    /// Create a handle rooted at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(RwLock::new(path.into())),
        }
    }

    /// Read the current working directory.
    pub fn get(&self) -> PathBuf {
        self.path.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the current working directory.
    pub fn set(&self, path: impl AsRef<Path>) {
        let mut guard = self.path.write().unwrap_or_else(|e| e.into_inner());
        *guard = path.as_ref().to_path_buf();
    }
}
