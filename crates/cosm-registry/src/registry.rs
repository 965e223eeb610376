//! On-disk documents that make up a registry.
//!
//! Layout of a registry working copy:
//! ```text
//! <registry>/
//!   registry.json              — name, UUID, Git URL, package map
//!   <LETTER>/<package>/
//!     versions.json            — version catalog
//!     <tag>/specs.json         — one version spec per release
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::project::Dependency;
use crate::store;

pub const REGISTRY_FILE: &str = "registry.json";
pub const INDEX_FILE: &str = "registries.json";
pub const VERSIONS_FILE: &str = "versions.json";
pub const SPECS_FILE: &str = "specs.json";

/// Descriptor stored at the root of every registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub name: String,
    pub uuid: String,
    #[serde(rename = "giturl")]
    pub git_url: String,
    /// Package name → package UUID.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub packages: BTreeMap<String, String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Registry {
    /// A fresh descriptor with a new UUID and no packages.
    pub fn new(name: &str, git_url: &str) -> Self {
        Registry {
            name: name.to_string(),
            uuid: uuid::Uuid::new_v4().to_string(),
            git_url: git_url.to_string(),
            packages: BTreeMap::new(),
        }
    }

    /// Load the descriptor from a registry working copy.
    ///
    /// The package map is always initialized, even when the file omits it
    /// or stores `null`.
    pub fn load(registry_dir: &Path) -> Result<Self> {
        store::read_json(&registry_dir.join(REGISTRY_FILE))
    }

    pub fn save(&self, registry_dir: &Path) -> Result<()> {
        store::write_json(&registry_dir.join(REGISTRY_FILE), self)
    }
}

/// Ordered list of known registry names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistriesIndex {
    path: PathBuf,
    names: Vec<String>,
}

impl RegistriesIndex {
    /// Load the index; a missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        let names: Vec<String> = store::read_json_or_default(path)?;
        Ok(RegistriesIndex {
            path: path.to_path_buf(),
            names,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Fail with `RegistryNotFound` unless `name` is indexed.
    pub fn require(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(RegistryError::RegistryNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Append a name; duplicates are rejected.
    pub fn add(&mut self, name: &str) -> Result<()> {
        if self.contains(name) {
            return Err(RegistryError::RegistryExists {
                name: name.to_string(),
            });
        }
        self.names.push(name.to_string());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.require(name)?;
        self.names.retain(|n| n != name);
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        store::write_json(&self.path, &self.names)
    }
}

/// Whether `name` can be used as a single directory name inside a registry.
///
/// Rejects path separators and hidden or relative components (`.`, `..`,
/// any leading `.`).
pub fn is_path_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\'])
}

/// Directory of a package inside a registry: `<LETTER>/<name>`.
pub fn package_dir(registry_dir: &Path, package: &str) -> Result<PathBuf> {
    let first = package
        .chars()
        .next()
        .ok_or_else(|| RegistryError::invalid("package name cannot be empty"))?;
    if !is_path_safe_name(package) {
        return Err(RegistryError::invalid(format!(
            "package name '{package}' is not a valid directory name"
        )));
    }
    Ok(registry_dir
        .join(first.to_uppercase().to_string())
        .join(package))
}

/// The list of released tags of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    path: PathBuf,
    versions: Vec<String>,
}

impl VersionCatalog {
    /// Load `versions.json` from a package directory; missing means empty.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(VERSIONS_FILE);
        let versions: Vec<String> = store::read_json_or_default(&path)?;
        Ok(VersionCatalog { path, versions })
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.versions.iter().any(|v| v == tag)
    }

    /// Append `tag` unless present. Returns whether it was added.
    pub fn add(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.versions.push(tag.to_string());
        true
    }

    /// Drop `tag`, keeping the remaining order. Returns whether it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.versions.len();
        self.versions.retain(|v| v != tag);
        self.versions.len() != before
    }

    pub fn save(&self) -> Result<()> {
        store::write_json(&self.path, &self.versions)
    }
}

/// Record of one published (package, version) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    pub name: String,
    pub uuid: String,
    pub version: String,
    #[serde(rename = "giturl")]
    pub git_url: String,
    pub sha1: String,
    #[serde(default)]
    pub deps: Vec<Dependency>,
}

impl VersionSpec {
    /// Write `<package_dir>/<version>/specs.json`.
    pub fn write(&self, package_dir: &Path) -> Result<PathBuf> {
        let version_dir = package_dir.join(&self.version);
        std::fs::create_dir_all(&version_dir).map_err(RegistryError::io(&version_dir))?;
        let path = version_dir.join(SPECS_FILE);
        store::write_json(&path, self)?;
        Ok(path)
    }

    pub fn load(package_dir: &Path, version: &str) -> Result<Self> {
        store::read_json(&package_dir.join(version).join(SPECS_FILE))
    }
}
