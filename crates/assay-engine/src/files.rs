//! File reading capability used for `file://` schema sources.

use std::io;
use std::path::{Path, PathBuf};

pub trait FileSource: Send + Sync {
    /// Read the file at `path`, relative to the source's root.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads files relative to a working directory.
#[derive(Debug, Clone)]
pub struct LocalFiles {
    root: PathBuf,
}

impl LocalFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSource for LocalFiles {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}
