//! Registering packages and publishing new releases into a registry.

use std::path::Path;

use crate::error::{RegistryError, Result};
use crate::lifecycle::Registries;
use crate::project::{Project, PROJECT_FILE};
use crate::registry::{self, VersionCatalog, VersionSpec};
use crate::version;

/// Result of registering a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredPackage {
    pub name: String,
    pub uuid: String,
    /// Tags published by this registration, in catalog order.
    pub versions: Vec<String>,
}

impl Registries {
    /// Register the package at `package_url` in `registry_name`.
    ///
    /// Every version tag of the package is published. An untagged package is
    /// tagged with its manifest version first, and the tag is pushed back to
    /// the package's remote.
    pub fn add_package(&self, registry_name: &str, package_url: &str) -> Result<RegisteredPackage> {
        if package_url.is_empty() {
            return Err(RegistryError::invalid("package git URL cannot be empty"));
        }
        let (registry_dir, mut registry) = self.open_synced(registry_name)?;

        let cache = self.clone_cache();
        let clone = cache.clone_temp(&self.git, package_url)?;
        let project = load_manifest(clone.path(), package_url)?;
        project.validate(package_url)?;

        if registry.packages.contains_key(&project.name) {
            return Err(RegistryError::AlreadyRegistered {
                name: project.name,
                registry: registry_name.to_string(),
            });
        }

        let tags = self.release_tags(clone.path(), &project, package_url)?;

        let package_dir = registry::package_dir(&registry_dir, &project.name)?;
        let mut catalog = VersionCatalog::load(&package_dir)?;
        for tag in &tags {
            let spec = VersionSpec {
                name: project.name.clone(),
                uuid: project.uuid.clone(),
                version: tag.clone(),
                git_url: package_url.to_string(),
                sha1: self.git.rev_for_tag(clone.path(), tag)?,
                deps: project.dependencies.clone(),
            };
            spec.write(&package_dir)?;
            catalog.add(tag);
        }
        catalog.save()?;

        cache.persist(clone, &project.uuid)?;

        registry
            .packages
            .insert(project.name.clone(), project.uuid.clone());
        registry.save(&registry_dir)?;
        self.commit_and_push(
            &registry_dir,
            &format!("Added package {} version {}", project.name, tags[0]),
        )?;

        tracing::info!(
            "registered package '{}' in registry '{registry_name}' with {} version(s)",
            project.name,
            tags.len()
        );
        Ok(RegisteredPackage {
            name: project.name,
            uuid: project.uuid,
            versions: tags,
        })
    }

    /// Version tags to publish from a fresh package clone. Never empty.
    fn release_tags(
        &self,
        repo: &Path,
        project: &Project,
        package_url: &str,
    ) -> Result<Vec<String>> {
        let tags = self.git.list_tags(repo)?;
        if tags.is_empty() {
            let tag = project.version.clone();
            tracing::info!("no tags in {package_url}, tagging {tag} from {PROJECT_FILE}");
            self.git.create_tag(repo, &tag)?;
            self.git.push(repo, &tag, true)?;
            return Ok(vec![tag]);
        }
        let matching: Vec<String> = tags
            .iter()
            .filter(|t| version::is_version_tag(t))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Err(RegistryError::InvalidManifest {
                source_url: package_url.to_string(),
                detail: format!("no valid version tags among: {}", tags.join(", ")),
            });
        }
        Ok(matching)
    }

    /// Publish an already tagged release of a registered package.
    ///
    /// `project_dir` is the package's Git working copy, which supplies the
    /// tag's commit hash and the package URL.
    pub fn publish_release(
        &self,
        registry_name: &str,
        project_dir: &Path,
        project: &Project,
        tag: &str,
    ) -> Result<VersionSpec> {
        let (registry_dir, registry) = self.open_synced(registry_name)?;

        let registered = registry
            .packages
            .get(&project.name)
            .ok_or_else(|| RegistryError::PackageNotFound {
                name: project.name.clone(),
                registry: registry_name.to_string(),
            })?;
        if *registered != project.uuid {
            return Err(RegistryError::UuidMismatch {
                name: project.name.clone(),
                registered: registered.clone(),
                project: project.uuid.clone(),
            });
        }

        let package_dir = registry::package_dir(&registry_dir, &project.name)?;
        let mut catalog = VersionCatalog::load(&package_dir)?;
        if catalog.contains(tag) {
            return Err(RegistryError::VersionExists {
                name: project.name.clone(),
                version: tag.to_string(),
                registry: registry_name.to_string(),
            });
        }

        let spec = VersionSpec {
            name: project.name.clone(),
            uuid: project.uuid.clone(),
            version: tag.to_string(),
            git_url: self.git.remote_url(project_dir)?,
            sha1: self.git.rev_for_tag(project_dir, tag)?,
            deps: project.dependencies.clone(),
        };
        spec.write(&package_dir)?;
        catalog.add(tag);
        catalog.save()?;
        self.commit_and_push(
            &registry_dir,
            &format!("Added package {} version {tag}", project.name),
        )?;

        tracing::info!(
            "published {} {tag} to registry '{registry_name}'",
            project.name
        );
        Ok(spec)
    }
}

/// Read `Project.json` from a package clone, reporting problems against the URL.
fn load_manifest(repo: &Path, package_url: &str) -> Result<Project> {
    if !Project::exists(repo) {
        return Err(RegistryError::InvalidManifest {
            source_url: package_url.to_string(),
            detail: format!("{PROJECT_FILE} not found"),
        });
    }
    Project::load(repo).map_err(|e| RegistryError::InvalidManifest {
        source_url: package_url.to_string(),
        detail: e.to_string(),
    })
}
