//! Filesystem Asset Store

use crate::AssetError;
use chrono::Utc;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];
const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Store for uploaded images, rooted at a single uploads directory.
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Open the store, creating the uploads directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check an upload against the allow-list without writing anything.
    ///
    /// Both the filename extension and the declared MIME type must match;
    /// callers use this to reject a batch of uploads before the first write.
    pub fn validate(original_name: &str, content_type: &str) -> Result<(), AssetError> {
        Self::validated_extension(original_name, content_type).map(|_| ())
    }

    /// Write `bytes` under a freshly generated name and return that name.
    pub async fn save(
        &self,
        field: &str,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, AssetError> {
        let ext = Self::validated_extension(original_name, content_type)?;
        let name = generate_name(field, &ext);
        let path = self.resolve(&name)?;

        tokio::fs::write(&path, bytes).await?;
        debug!(asset = %name, size = bytes.len(), "stored asset");
        Ok(name)
    }

    /// Delete a stored asset. Missing files surface as [`AssetError::NotFound`]
    /// so callers can decide whether that matters.
    pub async fn remove(&self, name: &str) -> Result<(), AssetError> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(asset = %name, "removed asset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AssetError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a file under `name` currently exists.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Absolute path of a stored asset.
    pub fn path(&self, name: &str) -> Result<PathBuf, AssetError> {
        self.resolve(name)
    }

    fn validated_extension(original_name: &str, content_type: &str) -> Result<String, AssetError> {
        let ext = extension(original_name)
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| AssetError::UnsupportedFormat(original_name.to_string()))?;
        if !ALLOWED_MIME_TYPES.contains(&content_type) {
            return Err(AssetError::UnsupportedFormat(content_type.to_string()));
        }
        Ok(ext)
    }

    // Generated names never contain separators; reject anything that would
    // resolve outside the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, AssetError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(AssetError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// `{field}-{unix_millis}-{9-digit random}.{ext}`, the same shape the original
/// deployment used, so existing uploads directories keep working.
fn generate_name(field: &str, ext: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{field}-{millis}-{suffix:09}.{ext}")
}
