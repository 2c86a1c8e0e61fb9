use crate::error::{CoreError, CoreResult};
use crate::records::model::CollectionKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_NODES_FILE: &str = "Nodes.csv";
pub const DEFAULT_EDGES_FILE: &str = "Edges.csv";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_IMAGES_SUBDIR: &str = "images";
pub const DEFAULT_WEB_URL_BASE: &str = "http://localhost:8000";

/// On-disk layout of a store. An empty `root` means the current directory,
/// which keeps generated local paths relative (`public/images/<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub nodes_file: String,
    pub edges_file: String,
    pub public_dir: String,
    pub images_subdir: String,
    pub web_url_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            nodes_file: DEFAULT_NODES_FILE.to_string(),
            edges_file: DEFAULT_EDGES_FILE.to_string(),
            public_dir: DEFAULT_PUBLIC_DIR.to_string(),
            images_subdir: DEFAULT_IMAGES_SUBDIR.to_string(),
            web_url_base: DEFAULT_WEB_URL_BASE.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn rooted(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Reads a JSON config file. A relative `root` is taken relative to the
    /// directory holding the config file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut cfg: StoreConfig = serde_json::from_slice(&bytes)?;
        if cfg.root.is_relative() {
            if let Some(parent) = path.parent() {
                cfg.root = parent.join(&cfg.root);
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("nodes_file", &self.nodes_file),
            ("edges_file", &self.edges_file),
            ("public_dir", &self.public_dir),
            ("images_subdir", &self.images_subdir),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidInput(format!("{} must not be empty", name)));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(CoreError::InvalidInput(format!(
                    "{} must be a single path component: {}",
                    name, value
                )));
            }
        }
        if self.nodes_file == self.edges_file {
            return Err(CoreError::InvalidInput(
                "nodes_file and edges_file must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn table_path(&self, kind: CollectionKind) -> PathBuf {
        match kind {
            CollectionKind::Node => self.root.join(&self.nodes_file),
            CollectionKind::Edge => self.root.join(&self.edges_file),
        }
    }

    pub fn asset_dir(&self) -> PathBuf {
        self.root.join(&self.public_dir).join(&self.images_subdir)
    }

    /// Logical prefix shared by every asset reference, e.g. `/public/images`.
    pub fn asset_url_prefix(&self) -> String {
        format!("/{}/{}", self.public_dir, self.images_subdir)
    }

    /// Where a stored local path points on disk. Paths generated by this store
    /// already carry the root; older entries hold paths relative to it.
    pub fn resolve_local_path(&self, local_path: &str) -> PathBuf {
        let path = Path::new(local_path);
        if path.is_absolute() || self.root.as_os_str().is_empty() || path.starts_with(&self.root) {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
