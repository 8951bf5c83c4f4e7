//! Per-file mutual exclusion and optimistic write checks.
//!
//! Every read-modify-write of a component document or the manifest holds an exclusive
//! advisory lock on a sidecar file under `.pagesmith/locks/`, and the final write is
//! refused if the file no longer hashes to what was read.

use crate::error::{LifecycleError, Result};
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Lock `target` exclusively. Blocks (off the async executor) until the lock is free.
pub async fn acquire_file_lock(lock_dir: &Path, target: &Path) -> Result<FileLock> {
    let path = lock_dir.join(format!("{}.lock", safe_file_component(target)));
    tokio::fs::create_dir_all(lock_dir).await?;

    tokio::task::spawn_blocking(move || -> Result<FileLock> {
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| LifecycleError::Other(format!("open lock {}: {err}", path.display())))?;

        let start = Instant::now();
        file.lock_exclusive().map_err(|err| {
            LifecycleError::Other(format!("acquire lock {}: {err}", path.display()))
        })?;
        log::debug!(
            "locked {} after {}ms",
            path.display(),
            start.elapsed().as_millis()
        );

        Ok(FileLock { file, path })
    })
    .await
    .map_err(|err| LifecycleError::Other(format!("join lock task: {err}")))?
}

fn safe_file_component(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// File contents plus the digest they had when read. A missing file reads as empty
/// with no digest.
#[derive(Debug, Clone)]
pub struct VersionedFile {
    path: PathBuf,
    content: String,
    digest: Option<String>,
}

impl VersionedFile {
    pub async fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Self {
                digest: Some(sha256_hex(content.as_bytes())),
                content,
                path,
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self {
                path,
                content: String::new(),
                digest: None,
            }),
            Err(err) => Err(err.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn exists(&self) -> bool {
        self.digest.is_some()
    }

    /// Write `content` unless the file changed since [`VersionedFile::read`].
    pub async fn write_if_unchanged(&self, content: &str) -> Result<()> {
        let current = match tokio::fs::read(&self.path).await {
            Ok(bytes) => Some(sha256_hex(&bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        if current != self.digest {
            log::warn!("refusing to overwrite {}: changed since read", self.path.display());
            return Err(LifecycleError::Conflict(self.path.clone()));
        }
        write_atomic(&self.path, content.as_bytes()).await
    }
}

pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| LifecycleError::Other(format!("{} has no parent", path.display())))?;
    tokio::fs::create_dir_all(parent).await?;

    let tmp = parent.join(format!(
        ".{}.tmp-{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("pagesmith"),
        std::process::id()
    ));
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_is_refused_after_concurrent_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Hero.astro");
        tokio::fs::write(&path, "<h1>A</h1>").await.unwrap();

        let read = VersionedFile::read(&path).await.unwrap();
        tokio::fs::write(&path, "<h1>B</h1>").await.unwrap();

        let err = read.write_if_unchanged("<h1>C</h1>").await.unwrap_err();
        assert!(matches!(err, LifecycleError::Conflict(_)));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<h1>B</h1>");
    }

    #[tokio::test]
    async fn missing_file_can_be_created_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pages/index.astro");

        let read = VersionedFile::read(&path).await.unwrap();
        assert!(!read.exists());
        read.write_if_unchanged("<main></main>\n").await.unwrap();
        assert!(matches!(
            read.write_if_unchanged("<main></main>\n").await,
            Err(LifecycleError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn lock_is_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Faq.astro");
        let first = acquire_file_lock(dir.path(), &target).await.unwrap();
        let lock_path = first.path().to_path_buf();
        drop(first);

        let second = acquire_file_lock(dir.path(), &target).await.unwrap();
        assert_eq!(second.path(), lock_path);
    }
}
