use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default upload root for local development.
pub const DEFAULT_UPLOAD_ROOT: &str = "./uploads";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which project-scoped asset directories live.
    pub upload_root: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            upload_root: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_ROOT)),
        })
    }

    pub fn for_root(upload_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_root: upload_root.into(),
        }
    }
}
