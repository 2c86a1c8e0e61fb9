use crate::error::{CoreError, CoreResult};
use crate::storage::config::StoreConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub asset_url: String,
    pub local_path: String,
}

/// Managed directory of evidence images, `<root>/<public_dir>/<images_subdir>`.
pub struct AssetStore {
    dir: PathBuf,
    url_prefix: String,
}

impl AssetStore {
    pub fn open(cfg: &StoreConfig) -> CoreResult<Self> {
        let assets = Self::attach(cfg);
        fs::create_dir_all(&assets.dir)?;
        Ok(assets)
    }

    /// Handle on the directory without touching the filesystem. `store`
    /// creates the directory on first use.
    pub fn attach(cfg: &StoreConfig) -> Self {
        Self {
            dir: cfg.asset_dir(),
            url_prefix: cfg.asset_url_prefix(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self, source: impl AsRef<Path>) -> CoreResult<StoredAsset> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(CoreError::AssetNotFound(source.display().to_string()));
        }

        let file_name = generated_name(source);
        let target = self.dir.join(&file_name);
        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::copy(source, &target))
            .map_err(|e| {
                CoreError::AssetCopyFailed(format!(
                    "{} -> {}: {}",
                    source.display(),
                    target.display(),
                    e
                ))
            })?;

        let stored = StoredAsset {
            asset_url: format!("{}/{}", self.url_prefix, file_name),
            local_path: to_forward_slashes(&target),
        };
        debug!(source = %source.display(), local_path = %stored.local_path, "asset stored");
        Ok(stored)
    }

    /// Best-effort removal. Returns whether the file was deleted; failures and
    /// paths outside the managed directory are logged and skipped.
    pub fn delete(&self, local_path: &str) -> bool {
        if local_path.is_empty() {
            return false;
        }
        let path = Path::new(local_path);
        if !self.manages(path) {
            warn!(local_path, dir = %self.dir.display(), "refusing to delete file outside asset directory");
            return false;
        }
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(local_path, "asset deleted");
                true
            }
            Err(err) => {
                warn!(local_path, error = %err, "asset delete failed");
                false
            }
        }
    }

    pub fn manages(&self, path: &Path) -> bool {
        let normalized = PathBuf::from(to_forward_slashes(path));
        let dir = PathBuf::from(to_forward_slashes(&self.dir));
        normalized.parent() == Some(dir.as_path())
    }
}

fn generated_name(source: &Path) -> String {
    let token = Ulid::new().to_string().to_ascii_lowercase();
    match source.extension().and_then(|x| x.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", token, ext),
        _ => token,
    }
}

pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
