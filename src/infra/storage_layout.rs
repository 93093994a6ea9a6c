use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "palaver";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub data_dir: PathBuf,
}

impl StorageLayout {
    /// Resolves the data directory: an explicit override wins, otherwise
    /// `$XDG_DATA_HOME/palaver` with a `~/.local/share` fallback.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, AppError> {
        if let Some(dir) = override_dir {
            return Ok(Self {
                data_dir: dir.to_path_buf(),
            });
        }

        let data_base = env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| AppError::StoragePathResolution {
                details: "unable to resolve data base directory (XDG_DATA_HOME/HOME)".into(),
            })?;

        Ok(Self {
            data_dir: data_base.join(APP_DIR_NAME),
        })
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| AppError::StorageDirCreate {
            path: self.data_dir.clone(),
            source,
        })
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    pub fn store_lock_file(&self) -> PathBuf {
        self.data_dir.join("store.lock")
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}
