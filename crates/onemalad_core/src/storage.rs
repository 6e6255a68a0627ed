//! Object storage for uploaded images. There is no delete path.

use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::clock;
use crate::config::StorageConfig;
use crate::error::StoreResult;
use crate::validate;

pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `folder` and returns a publicly fetchable URL.
    fn upload(&self, folder: &str, file_name: &str, bytes: &[u8]) -> StoreResult<String>;
}

pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root.clone(), config.public_base_url.clone())
    }
}

impl ObjectStore for FsObjectStore {
    fn upload(&self, folder: &str, file_name: &str, bytes: &[u8]) -> StoreResult<String> {
        let stored_name = format!("{}-{}", clock::unix_millis(), sanitize_file_name(file_name));
        let dir = self.root.join(folder);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&stored_name), bytes)?;
        debug!(folder, file = %stored_name, size = bytes.len(), "uploaded object");
        Ok(format!("{}/{folder}/{stored_name}", self.public_base_url))
    }
}

/// Anything outside `[A-Za-z0-9.]` becomes `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

/// Uploads one after another into the `issues` folder, stopping at the
/// first failure.
pub fn upload_issue_images(
    store: &dyn ObjectStore,
    files: &[(String, Vec<u8>)],
) -> StoreResult<Vec<String>> {
    validate::check_image_count(files.len())?;
    for (name, bytes) in files {
        validate::check_image_size(name, bytes.len() as u64)?;
    }
    let mut urls = Vec::with_capacity(files.len());
    for (name, bytes) in files {
        urls.push(store.upload("issues", name, bytes)?);
    }
    Ok(urls)
}
