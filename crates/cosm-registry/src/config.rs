//! Optional user configuration at `<cosm home>/config.toml`.
//!
//! ```toml
//! [git]
//! program = "/usr/bin/git"
//!
//! [identity]
//! name = "Jane Doe"
//! email = "jane@example.com"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::git::{Git, Identity};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CosmConfig {
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Git executable; defaults to `git` on `PATH`.
    #[serde(default)]
    pub program: Option<PathBuf>,
}

/// Commit identity used for registry commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
}

impl CosmConfig {
    /// Load the config file; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(CosmConfig::default());
        }
        let content = std::fs::read_to_string(path).map_err(RegistryError::io(path))?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| RegistryError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the git handle this configuration describes.
    pub fn git(&self) -> Git {
        let git = match &self.git.program {
            Some(program) => Git::new(program),
            None => Git::default(),
        };
        match &self.identity {
            Some(id) => git.with_identity(Identity {
                name: id.name.clone(),
                email: id.email.clone(),
            }),
            None => git,
        }
    }
}
