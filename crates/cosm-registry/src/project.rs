//! `Project.json` — a package's own identity, version and dependencies.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::registry;
use crate::store;
use crate::version::{self, Version};

/// File name of the project manifest at a project root.
pub const PROJECT_FILE: &str = "Project.json";

/// Version given to projects created without an explicit one.
pub const DEFAULT_VERSION: &str = "v0.1.0";

/// The project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A direct dependency of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    /// Use a local checkout instead of the published version.
    #[serde(default)]
    pub develop: bool,
}

impl Project {
    /// A new project with a fresh UUID and no dependencies.
    pub fn new(name: &str, version: &str) -> Self {
        Project {
            name: name.to_string(),
            uuid: uuid::Uuid::new_v4().to_string(),
            authors: Vec::new(),
            language: None,
            version: version.to_string(),
            dependencies: Vec::new(),
        }
    }

    pub fn exists(dir: &Path) -> bool {
        dir.join(PROJECT_FILE).is_file()
    }

    /// Load `Project.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        if !Self::exists(dir) {
            return Err(RegistryError::ProjectNotFound {
                dir: dir.to_path_buf(),
            });
        }
        store::read_json(&dir.join(PROJECT_FILE))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        store::write_json(&dir.join(PROJECT_FILE), self)
    }

    /// Check the fields a registry needs before accepting the package.
    ///
    /// `source` names where the manifest came from, for error messages.
    pub fn validate(&self, source: &str) -> Result<Version> {
        let fail = |detail: String| RegistryError::InvalidManifest {
            source_url: source.to_string(),
            detail,
        };
        if self.name.is_empty() {
            return Err(fail("Project.json does not contain a valid package name".into()));
        }
        if !registry::is_path_safe_name(&self.name) {
            return Err(fail(format!(
                "package name '{}' must not contain path separators or start with '.'",
                self.name
            )));
        }
        if self.uuid.is_empty() {
            return Err(fail("Project.json does not contain a valid UUID".into()));
        }
        if let Err(e) = uuid::Uuid::parse_str(&self.uuid) {
            return Err(fail(format!("invalid UUID '{}': {e}", self.uuid)));
        }
        if self.version.is_empty() {
            return Err(fail("Project.json does not contain a version".into()));
        }
        version::parse_version(&self.version)
            .map_err(|e| fail(format!("invalid version: {e}")))
    }

    pub fn find_dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    fn dependency_mut(&mut self, name: &str) -> Result<&mut Dependency> {
        self.dependencies
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| RegistryError::DependencyNotFound {
                name: name.to_string(),
            })
    }

    /// Append a dependency. Versions must be tags (`v1.2.3`).
    pub fn add_dependency(&mut self, name: &str, version: &str) -> Result<()> {
        if name.is_empty() {
            return Err(RegistryError::invalid("dependency name cannot be empty"));
        }
        if !version.starts_with('v') {
            return Err(RegistryError::invalid(format!(
                "version '{version}' must start with 'v'"
            )));
        }
        version::parse_version(version)?;
        if let Some(existing) = self.find_dependency(name) {
            return Err(RegistryError::DependencyExists {
                name: name.to_string(),
                version: existing.version.clone(),
            });
        }
        self.dependencies.push(Dependency {
            name: name.to_string(),
            version: version.to_string(),
            develop: false,
        });
        Ok(())
    }

    /// Remove a dependency, preserving the order of the others.
    pub fn remove_dependency(&mut self, name: &str) -> Result<Dependency> {
        let idx = self
            .dependencies
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| RegistryError::DependencyNotFound {
                name: name.to_string(),
            })?;
        Ok(self.dependencies.remove(idx))
    }

    /// Put a dependency into development mode.
    pub fn develop(&mut self, name: &str) -> Result<&Dependency> {
        let dep = self.dependency_mut(name)?;
        dep.develop = true;
        Ok(&*dep)
    }

    /// Take a dependency out of development mode.
    pub fn free(&mut self, name: &str) -> Result<&Dependency> {
        let dep = self.dependency_mut(name)?;
        if !dep.develop {
            return Err(RegistryError::NotInDevelopMode {
                name: dep.name.clone(),
                version: dep.version.clone(),
            });
        }
        dep.develop = false;
        Ok(&*dep)
    }

    /// Pin a dependency to another version; returns the previous one.
    pub fn set_dependency_version(&mut self, name: &str, version: &str) -> Result<String> {
        version::parse_version(version)?;
        let dep = self.dependency_mut(name)?;
        Ok(std::mem::replace(&mut dep.version, version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        let mut p = Project::new("myproject", "v0.1.0");
        p.add_dependency("mypkg", "v1.2.3").unwrap();
        p.add_dependency("otherpkg", "v2.0.0").unwrap();
        p
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let project = sample();
        project.save(dir.path()).unwrap();
        assert_eq!(Project::load(dir.path()).unwrap(), project);
    }

    #[test]
    fn load_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::load(dir.path()),
            Err(RegistryError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn load_minimal_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            r#"{"name": "legacy", "version": "v0.1.0"}"#,
        )
        .unwrap();
        let p = Project::load(dir.path()).unwrap();
        assert_eq!(p.name, "legacy");
        assert!(p.uuid.is_empty());
        assert!(p.dependencies.is_empty());
    }

    #[test]
    fn add_rejects_bad_versions_and_duplicates() {
        let mut p = sample();
        assert!(p.add_dependency("x", "1.2.3").is_err());
        assert!(p.add_dependency("x", "v1").is_err());
        assert!(matches!(
            p.add_dependency("mypkg", "v9.0.0"),
            Err(RegistryError::DependencyExists { .. })
        ));
        assert_eq!(p.dependencies.len(), 2);
    }

    #[test]
    fn remove_preserves_order() {
        let mut p = sample();
        p.add_dependency("third", "v0.3.0").unwrap();
        p.remove_dependency("otherpkg").unwrap();
        let names: Vec<_> = p.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["mypkg", "third"]);
        assert!(matches!(
            p.remove_dependency("otherpkg"),
            Err(RegistryError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn develop_then_free() {
        let mut p = sample();
        assert!(p.develop("mypkg").unwrap().develop);
        assert!(!p.free("mypkg").unwrap().develop);
        assert!(matches!(
            p.free("mypkg"),
            Err(RegistryError::NotInDevelopMode { .. })
        ));
        assert!(p.develop("missing").is_err());
    }

    #[test]
    fn validation_reasons() {
        let good = Project::new("pkg", "v1.0.0");
        assert_eq!(good.validate("url").unwrap(), Version::new(1, 0, 0));

        let mut p = good.clone();
        p.name.clear();
        assert!(p.validate("url").unwrap_err().to_string().contains("package name"));

        for bad in ["../../escaped", "a/b", "..", ".git"] {
            let mut p = good.clone();
            p.name = bad.into();
            let err = p.validate("url").unwrap_err();
            assert!(err.to_string().contains("path separators"), "{bad}: {err}");
        }

        let mut p = good.clone();
        p.uuid.clear();
        assert!(p.validate("url").unwrap_err().to_string().contains("valid UUID"));

        let mut p = good.clone();
        p.uuid = "not-a-uuid".into();
        assert!(p.validate("url").unwrap_err().to_string().contains("invalid UUID"));

        let mut p = good.clone();
        p.version.clear();
        assert!(p.validate("url").unwrap_err().to_string().contains("version"));

        let mut p = good;
        p.version = "v1.x".into();
        assert!(p.validate("url").unwrap_err().to_string().contains("invalid version"));
    }

    #[test]
    fn pin_dependency() {
        let mut p = sample();
        let old = p.set_dependency_version("mypkg", "v1.3.0").unwrap();
        assert_eq!(old, "v1.2.3");
        assert_eq!(p.find_dependency("mypkg").unwrap().version, "v1.3.0");
    }
}
