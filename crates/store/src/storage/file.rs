use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{KeyValueStore, Result, StorageError};

/// Filesystem-backed key-value store.
///
/// Directory structure:
/// ```text
/// data_dir/
/// ├── %40GoMarkeplace%3Aproducts.json
/// └── other-key.json
/// ```
///
/// Keys are percent-encoded into filenames so that any key maps to exactly one
/// file. Writes go to a sibling `.tmp` file which is then renamed over the
/// target, so a reader never observes a partially written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for an empty key.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.json", encode_key(key)?)))
    }
}

/// Percent-encode every byte outside `[A-Za-z0-9._~-]`.
fn encode_key(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key cannot be empty".to_owned()));
    }
    Ok(urlencoding::encode(key).into_owned())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            warn!(path = %path.display(), error = %e, "Failed to replace stored value");
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
