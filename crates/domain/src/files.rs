//! Physical storage for uploaded document files.
//!
//! Files live under `<root>/<client_id>/<stored name>`; the database records
//! the path relative to `root`.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute location of a stored file. Rejects anything that is not a
    /// plain relative path.
    pub fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let path = Path::new(relative);
        let plain = path.components().count() > 0
            && path.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to resolve stored path '{relative}'"),
            ));
        }
        Ok(self.root.join(path))
    }

    /// Write `bytes` and flush them to disk before returning.
    pub async fn write(&self, relative: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }

    pub async fn open(&self, relative: &str) -> io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.resolve(relative)?).await
    }

    /// Delete a stored file. Failures are logged and reported as `false`.
    pub async fn remove_best_effort(&self, relative: &str) -> bool {
        let result = match self.resolve(relative) {
            Ok(path) => tokio::fs::remove_file(path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "Failed to remove stored file");
                false
            }
        }
    }
}
