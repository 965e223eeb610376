//! The per-user cosm directory.
//!
//! Layout:
//! ```text
//! <home>/
//!   config.toml
//!   registries/
//!     registries.json
//!     <registry>/          — registry working copies
//!   clones/
//!     <package-uuid>/      — permanent package clones
//! ```

use std::path::{Path, PathBuf};

use crate::config::{CosmConfig, CONFIG_FILE};
use crate::error::{RegistryError, Result};
use crate::registry::{RegistriesIndex, INDEX_FILE};

/// Environment variable that overrides the home location.
pub const HOME_ENV: &str = "COSM_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosmHome {
    root: PathBuf,
}

impl CosmHome {
    pub fn new(root: PathBuf) -> Self {
        CosmHome { root }
    }

    /// `$COSM_HOME` if set, otherwise `~/.cosm`.
    pub fn locate() -> Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(CosmHome::new(PathBuf::from(dir)));
        }
        dirs::home_dir()
            .map(|home| CosmHome::new(home.join(".cosm")))
            .ok_or(RegistryError::Home)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registries_dir(&self) -> PathBuf {
        self.root.join("registries")
    }

    pub fn registry_dir(&self, name: &str) -> PathBuf {
        self.registries_dir().join(name)
    }

    pub fn index_path(&self) -> PathBuf {
        self.registries_dir().join(INDEX_FILE)
    }

    pub fn clones_dir(&self) -> PathBuf {
        self.root.join("clones")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn load_config(&self) -> Result<CosmConfig> {
        CosmConfig::load(&self.config_path())
    }

    pub fn load_index(&self) -> Result<RegistriesIndex> {
        RegistriesIndex::load(&self.index_path())
    }

    /// Create the registries and clones directories if needed.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [self.registries_dir(), self.clones_dir()] {
            std::fs::create_dir_all(&dir).map_err(RegistryError::io(&dir))?;
        }
        Ok(())
    }
}
