use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// On-disk photo storage.
///
/// Every photo is a flat file at `{dir}/{stored_name}`; names are random so
/// users never collide and never pick their own path.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Photo storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, stored_name: &str) -> PathBuf {
        self.dir.join(stored_name)
    }

    /// Write a photo and return where it landed. Recreates the directory if
    /// it was removed while running.
    pub async fn save(&self, stored_name: &str, data: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.file_path(stored_name);
        let mut file = fs::File::create(&path).await?;
        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;
        drop(file);

        // Never leave a truncated photo behind
        if let Err(e) = written {
            self.discard(&path).await;
            return Err(e.into());
        }

        Ok(path)
    }

    pub async fn read(&self, stored_name: &str) -> std::io::Result<Vec<u8>> {
        fs::read(self.file_path(stored_name)).await
    }

    /// Remove a file. A file that is already gone counts as removed.
    pub async fn delete_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("File {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort delete: failures are logged and swallowed.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = self.delete_file(path).await {
            warn!("Failed to delete {}: {}", path.display(), e);
        }
    }
}

/// Random stored name keeping a sanitised copy of the original extension.
pub fn stored_name(original: &str) -> String {
    let id = Uuid::new_v4();
    match extension(original) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn extension(original: &str) -> Option<String> {
    // Browsers on Windows may send a full client path
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_ascii_lowercase())
}

/// Names we are willing to serve: no separators, no leading dot.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
