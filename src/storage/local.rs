use super::ObjectStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Object store backed by a directory on local disk.
/// Keys are relative paths below `root`.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn read_text(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn write_text(&self, key: &str, text: &str) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} ({} bytes)", path.display(), text.len());
        Ok(())
    }

    async fn delete_key(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<BTreeSet<String>> {
        // The prefix names a directory ("json-files/2024-03-09/") or a file
        // name stem inside one ("logs/2024").
        let (dir, stem) = match prefix.rfind('/') {
            Some(pos) => (&prefix[..pos], &prefix[pos + 1..]),
            None => ("", prefix),
        };

        let mut keys = BTreeSet::new();
        collect_keys(&self.root, &self.root.join(dir), &mut keys).await?;

        let dir_prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        keys.retain(|key| {
            key.strip_prefix(&dir_prefix)
                .map(|rest| rest.starts_with(stem))
                .unwrap_or(false)
        });
        Ok(keys)
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.root.display())
    }
}

/// Walk `dir` recursively, pushing every file as a `/`-joined key relative to `root`
async fn collect_keys(root: &Path, dir: &Path, keys: &mut BTreeSet<String>) -> Result<()> {
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {}", current.display()))
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
                continue;
            }
            if let Ok(relative) = path.strip_prefix(root) {
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.insert(key);
            }
        }
    }

    Ok(())
}
