use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use aurora_core::ports::KeyValueStorePort;

/// Key-value store kept as one JSON object on disk.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target,
/// so a crash leaves either the old or the new map.
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create session store dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read session store failed: {}", self.path.display()))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("parse session store failed: {}", self.path.display()))
    }

    /// Map to modify. A corrupt file is replaced rather than blocking writes.
    async fn read_map_for_update(&self) -> Result<BTreeMap<String, String>> {
        match self.read_map().await {
            Ok(map) => Ok(map),
            Err(err) if self.path.exists() && err.downcast_ref::<serde_json::Error>().is_some() => {
                warn!(path = %self.path.display(), error = %err, "discarding corrupt session store");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn atomic_write(&self, map: &BTreeMap<String, String>) -> Result<()> {
        self.ensure_parent_dir().await?;

        let content = serde_json::to_string_pretty(map).context("serialize session store failed")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp session store failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp session store to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map_for_update().await?;
        map.insert(key.to_string(), value.to_string());
        self.atomic_write(&map).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map_for_update().await?;
        if map.remove(key).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.atomic_write(&map).await
    }
}
