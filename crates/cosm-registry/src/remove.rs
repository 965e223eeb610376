//! Removing packages and single versions from a registry.

use std::path::Path;

use crate::error::{RegistryError, Result};
use crate::lifecycle::Registries;
use crate::registry::{self, Registry, VersionCatalog};

/// What a version removal ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRemoval {
    /// Only the version was removed.
    Version,
    /// It was the last version, so the package went with it.
    Package,
}

impl Registries {
    /// Remove one version of a package.
    ///
    /// Removing the only remaining version requires `force` and then
    /// unregisters the package entirely.
    pub fn remove_version(
        &self,
        registry_name: &str,
        package: &str,
        tag: &str,
        force: bool,
    ) -> Result<VersionRemoval> {
        let (registry_dir, registry) = self.open_synced(registry_name)?;
        require_package(&registry, registry_name, package)?;

        let package_dir = registry::package_dir(&registry_dir, package)?;
        let mut catalog = VersionCatalog::load(&package_dir)?;
        if !catalog.contains(tag) {
            return Err(RegistryError::VersionNotFound {
                name: package.to_string(),
                version: tag.to_string(),
                registry: registry_name.to_string(),
            });
        }
        if catalog.versions().len() == 1 {
            if !force {
                return Err(RegistryError::LastVersion {
                    name: package.to_string(),
                    version: tag.to_string(),
                    registry: registry_name.to_string(),
                });
            }
            self.unregister(&registry_dir, registry, registry_name, package, true)?;
            return Ok(VersionRemoval::Package);
        }

        catalog.remove(tag);
        catalog.save()?;
        let version_dir = package_dir.join(tag);
        if version_dir.exists() {
            std::fs::remove_dir_all(&version_dir).map_err(RegistryError::io(&version_dir))?;
        }
        self.commit_and_push(
            &registry_dir,
            &format!("Removed version {tag} of package {package}"),
        )?;
        tracing::info!("removed {package} {tag} from registry '{registry_name}'");
        Ok(VersionRemoval::Version)
    }

    /// Unregister a package and delete all of its versions.
    ///
    /// With `force` the cached clone of the package is deleted too.
    pub fn remove_package(&self, registry_name: &str, package: &str, force: bool) -> Result<()> {
        let (registry_dir, registry) = self.open_synced(registry_name)?;
        require_package(&registry, registry_name, package)?;
        self.unregister(&registry_dir, registry, registry_name, package, force)
    }

    fn unregister(
        &self,
        registry_dir: &Path,
        mut registry: Registry,
        registry_name: &str,
        package: &str,
        drop_clone: bool,
    ) -> Result<()> {
        let package_dir = registry::package_dir(registry_dir, package)?;
        if package_dir.exists() {
            std::fs::remove_dir_all(&package_dir).map_err(RegistryError::io(&package_dir))?;
        }
        if let Some(letter_dir) = package_dir.parent() {
            // Only succeeds when no other package shares the letter.
            let _ = std::fs::remove_dir(letter_dir);
        }

        let uuid = registry.packages.remove(package);
        registry.save(registry_dir)?;
        self.commit_and_push(registry_dir, &format!("Removed package {package}"))?;

        if drop_clone {
            if let Some(uuid) = uuid {
                if self.clone_cache().remove(&uuid)? {
                    tracing::debug!("deleted cached clone for '{package}' ({uuid})");
                }
            }
        }
        tracing::info!("removed package '{package}' from registry '{registry_name}'");
        Ok(())
    }
}

fn require_package(registry: &Registry, registry_name: &str, package: &str) -> Result<()> {
    if registry.packages.contains_key(package) {
        Ok(())
    } else {
        Err(RegistryError::PackageNotFound {
            name: package.to_string(),
            registry: registry_name.to_string(),
        })
    }
}
