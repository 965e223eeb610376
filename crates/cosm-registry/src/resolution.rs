//! Looking packages up across registries and choosing versions.

use crate::error::{RegistryError, Result};
use crate::lifecycle::Registries;
use crate::registry::{self, Registry, VersionCatalog};
use crate::version;

/// Where a package was found and what it offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub registry: String,
    pub uuid: String,
    pub versions: Vec<String>,
}

impl PackageLocation {
    pub fn has_version(&self, tag: &str) -> bool {
        self.versions.iter().any(|v| v == tag)
    }
}

impl Registries {
    /// First registry, in index order, that knows `package`.
    pub fn find_package(&self, package: &str) -> Result<Option<PackageLocation>> {
        for name in self.names()? {
            let dir = self.home.registry_dir(&name);
            let registry = match Registry::load(&dir) {
                Ok(registry) => registry,
                Err(e) => {
                    tracing::warn!("skipping registry '{name}': {e}");
                    continue;
                }
            };
            if let Some(uuid) = registry.packages.get(package) {
                let catalog = VersionCatalog::load(&registry::package_dir(&dir, package)?)?;
                return Ok(Some(PackageLocation {
                    registry: name,
                    uuid: uuid.clone(),
                    versions: catalog.versions().to_vec(),
                }));
            }
        }
        Ok(None)
    }

    /// Like [`find_package`](Self::find_package) but a miss is an error.
    pub fn locate_package(&self, package: &str) -> Result<PackageLocation> {
        self.find_package(package)?
            .ok_or_else(|| RegistryError::PackageNotFound {
                name: package.to_string(),
                registry: "any registry".to_string(),
            })
    }
}

/// Pick the version to upgrade `current` to, if any.
///
/// Without `latest` only versions sharing the current major version are
/// considered. A `constraint` (`vX`, `vX.Y`, `vX.Y.Z`) narrows the candidates
/// further. Returns `None` when nothing is strictly newer.
pub fn select_upgrade(
    available: &[String],
    current: &str,
    constraint: Option<&str>,
    latest: bool,
) -> Result<Option<String>> {
    let current_major = version::major_version(current)?;
    let mut best: Option<&str> = None;
    for candidate in available {
        let major = match version::major_version(candidate) {
            Ok(major) => major,
            Err(e) => {
                tracing::debug!("ignoring unparseable version '{candidate}': {e}");
                continue;
            }
        };
        if !latest && major != current_major {
            continue;
        }
        if let Some(constraint) = constraint {
            if !version::matches_constraint(candidate, constraint)? {
                continue;
            }
        }
        best = Some(match best {
            Some(b) => version::max_version(b, candidate)?,
            None => candidate.as_str(),
        });
    }
    match best {
        Some(b) if version::is_newer(b, current)? => Ok(Some(b.to_string())),
        _ => Ok(None),
    }
}

/// Check that `target` is a published version strictly older than `current`.
pub fn check_downgrade(
    location: &PackageLocation,
    package: &str,
    current: &str,
    target: &str,
) -> Result<()> {
    if !location.has_version(target) {
        return Err(RegistryError::VersionNotFound {
            name: package.to_string(),
            version: target.to_string(),
            registry: location.registry.clone(),
        });
    }
    if !version::is_newer(current, target)? {
        return Err(RegistryError::invalid(format!(
            "version '{target}' is not older than the current version '{current}' of '{package}'"
        )));
    }
    Ok(())
}
