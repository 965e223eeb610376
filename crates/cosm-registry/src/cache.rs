//! Local cache of package clones.
//!
//! Packages are first cloned into a scratch directory under the cache root.
//! The scratch directory is removed when the [`TempClone`] is dropped, so
//! every early return cleans up after itself. A successful registration
//! moves the clone to its permanent, UUID-named location.
//!
//! Layout:
//! ```text
//! <cache_root>/
//!   tmp-clone-XXXXXX/repo/   — scratch clone (removed on drop)
//!   <package-uuid>/          — permanent clone
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{RegistryError, Result};
use crate::git::Git;

/// A clone living in a scratch directory that is deleted on drop.
#[derive(Debug)]
pub struct TempClone {
    // Held for its Drop; removes the scratch directory.
    _scratch: TempDir,
    path: PathBuf,
    url: String,
}

impl TempClone {
    /// Working copy root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// URL the clone was made from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Filesystem store of package clones keyed by package UUID.
#[derive(Debug, Clone)]
pub struct CloneCache {
    root: PathBuf,
}

impl CloneCache {
    pub fn new(root: PathBuf) -> Self {
        CloneCache { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the permanent clone of a package lives.
    pub fn package_path(&self, uuid: &str) -> PathBuf {
        self.root.join(uuid)
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.package_path(uuid).is_dir()
    }

    /// Clone `url` into a fresh scratch directory under the cache root.
    pub fn clone_temp(&self, git: &Git, url: &str) -> Result<TempClone> {
        std::fs::create_dir_all(&self.root).map_err(RegistryError::io(&self.root))?;
        let scratch = tempfile::Builder::new()
            .prefix("tmp-clone-")
            .tempdir_in(&self.root)
            .map_err(RegistryError::io(&self.root))?;
        let path = scratch.path().join("repo");
        git.clone_into(url, &path)?;
        tracing::debug!("cloned {url} into {}", path.display());
        Ok(TempClone {
            _scratch: scratch,
            path,
            url: url.to_string(),
        })
    }

    /// Move a scratch clone to its permanent location.
    ///
    /// An existing clone for the same UUID is replaced.
    pub fn persist(&self, clone: TempClone, uuid: &str) -> Result<PathBuf> {
        let dest = self.package_path(uuid);
        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(RegistryError::io(&dest))?;
            tracing::warn!(
                "replaced existing clone for UUID '{uuid}' at {}",
                dest.display()
            );
        }
        std::fs::rename(clone.path(), &dest).map_err(RegistryError::io(&dest))?;
        Ok(dest)
    }

    /// Delete the permanent clone of a package. Returns whether one existed.
    pub fn remove(&self, uuid: &str) -> Result<bool> {
        let path = self.package_path(uuid);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&path).map_err(RegistryError::io(&path))?;
        Ok(true)
    }
}
