//! Dependency commands: add, rm, develop, free, upgrade, downgrade.

use std::path::Path;

use anyhow::{bail, Context, Result};
use cosm_registry::{check_downgrade, select_upgrade, Project, Registries, RegistryError};

/// Split `name@v1.2.3` or take `name` plus a separate version.
fn parse_dependency_arg(spec: &str, version: Option<&str>) -> Result<(String, String)> {
    match (spec.split_once('@'), version) {
        (Some((name, v)), None) => Ok((name.to_string(), v.to_string())),
        (None, Some(v)) => Ok((spec.to_string(), v.to_string())),
        (Some(_), Some(_)) => bail!(
            "give the version either as <name>@<version> or as a separate argument, not both"
        ),
        (None, None) => bail!(
            "missing version: use 'cosm add <name> v<version>' or 'cosm add <name>@v<version>'"
        ),
    }
}

/// Run `cosm add <name> <version>` / `cosm add <name>@<version>`.
pub fn add(project_dir: &Path, regs: &Registries, spec: &str, version: Option<&str>) -> Result<()> {
    let (name, version) = parse_dependency_arg(spec, version)?;
    let mut project = Project::load(project_dir)?;
    project.add_dependency(&name, &version)?;

    match regs.find_package(&name)? {
        Some(location) if !location.has_version(&version) => {
            return Err(RegistryError::VersionNotFound {
                name,
                version,
                registry: location.registry,
            }
            .into());
        }
        Some(location) => {
            tracing::debug!("found {name} {version} in registry '{}'", location.registry);
        }
        None => {
            tracing::warn!("package '{name}' is not in any registry; adding it unverified");
        }
    }

    project.save(project_dir)?;
    println!("Added dependency '{name}' {version} to project");
    Ok(())
}

/// Run `cosm rm <name>`.
pub fn remove(project_dir: &Path, name: &str) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    project.remove_dependency(name)?;
    project.save(project_dir)?;
    println!("Removed dependency '{name}' from project");
    Ok(())
}

/// Run `cosm develop <name>`.
pub fn develop(project_dir: &Path, name: &str) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    let dep = match project.develop(name) {
        Ok(dep) => dep.clone(),
        Err(RegistryError::DependencyNotFound { .. }) => {
            bail!("dependency '{name}' not found in project. Use 'cosm add' to add it first.")
        }
        Err(e) => return Err(e.into()),
    };
    project.save(project_dir)?;
    println!("Switched '{}' {} to development mode", dep.name, dep.version);
    Ok(())
}

/// Run `cosm free <name>`.
pub fn free(project_dir: &Path, name: &str) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    let dep = project.free(name)?.clone();
    project.save(project_dir)?;
    println!("Closed development mode for '{}' {}", dep.name, dep.version);
    Ok(())
}

/// Run `cosm upgrade <name> [constraint] [--latest]` or `cosm upgrade --all [--latest]`.
pub fn upgrade(
    project_dir: &Path,
    regs: &Registries,
    name: Option<&str>,
    constraint: Option<&str>,
    all: bool,
    latest: bool,
) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    let targets: Vec<String> = match (name, all) {
        (Some(_), true) => bail!("specify either a dependency name or --all, not both"),
        (None, false) => bail!("specify a dependency name or --all"),
        (Some(name), false) => {
            if project.find_dependency(name).is_none() {
                return Err(RegistryError::DependencyNotFound {
                    name: name.to_string(),
                }
                .into());
            }
            vec![name.to_string()]
        }
        (None, true) => {
            if constraint.is_some() {
                bail!("a version constraint cannot be combined with --all");
            }
            project.dependencies.iter().map(|d| d.name.clone()).collect()
        }
    };
    if targets.is_empty() {
        println!("No dependencies to upgrade");
        return Ok(());
    }

    let mut changed = false;
    for target in &targets {
        let location = if all {
            match regs.find_package(target)? {
                Some(location) => location,
                None => {
                    tracing::warn!("skipping '{target}': not found in any registry");
                    continue;
                }
            }
        } else {
            regs.locate_package(target)?
        };
        let current = project
            .find_dependency(target)
            .map(|d| d.version.clone())
            .unwrap_or_default();
        match select_upgrade(&location.versions, &current, constraint, latest)
            .with_context(|| format!("selecting an upgrade for '{target}'"))?
        {
            Some(next) => {
                project.set_dependency_version(target, &next)?;
                changed = true;
                println!("Upgraded '{target}' from {current} to {next}");
            }
            None => println!("'{target}' is up to date ({current})"),
        }
    }
    if changed {
        project.save(project_dir)?;
    }
    Ok(())
}

/// Run `cosm downgrade <name> <version>`.
pub fn downgrade(project_dir: &Path, regs: &Registries, name: &str, version: &str) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    let current = project
        .find_dependency(name)
        .map(|d| d.version.clone())
        .ok_or_else(|| RegistryError::DependencyNotFound {
            name: name.to_string(),
        })?;
    let location = regs.locate_package(name)?;
    check_downgrade(&location, name, &current, version)?;
    project.set_dependency_version(name, version)?;
    project.save(project_dir)?;
    println!("Downgraded '{name}' from {current} to {version}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn load(dir: &Path) -> Project {
        Project::load(dir).unwrap()
    }

    #[test]
    fn add_argument_forms() {
        assert_eq!(
            parse_dependency_arg("pkg@v1.0.0", None).unwrap(),
            ("pkg".to_string(), "v1.0.0".to_string())
        );
        assert_eq!(
            parse_dependency_arg("pkg", Some("v1.0.0")).unwrap(),
            ("pkg".to_string(), "v1.0.0".to_string())
        );
        assert!(parse_dependency_arg("pkg", None).is_err());
        assert!(parse_dependency_arg("pkg@v1.0.0", Some("v1.0.0")).is_err());
    }

    #[test]
    fn add_unknown_package_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        let project_dir = testutil::project_dir(dir.path(), &[]);

        add(&project_dir, &regs, "mypkg@v1.2.3", None).unwrap();
        let dep = load(&project_dir).find_dependency("mypkg").cloned().unwrap();
        assert_eq!(dep.version, "v1.2.3");
        assert!(!dep.develop);
    }

    #[test]
    fn add_rejects_bad_version_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        let project_dir = testutil::project_dir(dir.path(), &[]);
        let before = std::fs::read(project_dir.join("Project.json")).unwrap();

        let err = add(&project_dir, &regs, "mypkg", Some("1.2.3")).unwrap_err();
        assert!(err.to_string().contains("must start with 'v'"));
        assert_eq!(std::fs::read(project_dir.join("Project.json")).unwrap(), before);
    }

    #[test]
    fn add_checks_registry_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        testutil::registry(dir.path(), &regs, "reg");
        let lib = Project::new("lib", "v1.0.0");
        let (remote, _) = testutil::package(dir.path(), &lib, &[]);
        regs.add_package("reg", remote.to_str().unwrap()).unwrap();
        let project_dir = testutil::project_dir(dir.path(), &[]);

        let err = add(&project_dir, &regs, "lib", Some("v2.0.0")).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(load(&project_dir).dependencies.is_empty());

        add(&project_dir, &regs, "lib", Some("v1.0.0")).unwrap();
        assert_eq!(load(&project_dir).dependencies.len(), 1);
    }

    #[test]
    fn remove_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = testutil::project_dir(dir.path(), &[("a", "v1.0.0"), ("b", "v2.0.0")]);
        remove(&project_dir, "a").unwrap();
        assert_eq!(load(&project_dir).dependencies.len(), 1);
        let err = remove(&project_dir, "a").unwrap_err();
        assert!(err.to_string().contains("dependency 'a' not found in project"));
    }

    #[test]
    fn develop_and_free() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = testutil::project_dir(dir.path(), &[("mypkg", "v1.2.3")]);

        develop(&project_dir, "mypkg").unwrap();
        assert!(load(&project_dir).find_dependency("mypkg").unwrap().develop);

        free(&project_dir, "mypkg").unwrap();
        assert!(!load(&project_dir).find_dependency("mypkg").unwrap().develop);

        let err = free(&project_dir, "mypkg").unwrap_err();
        assert!(err.to_string().contains("is not in development mode"));

        let err = develop(&project_dir, "missing").unwrap_err();
        assert!(err.to_string().contains("Use 'cosm add' to add it first."));
    }

    #[test]
    fn upgrade_and_downgrade() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        testutil::registry(dir.path(), &regs, "reg");
        let lib = Project::new("lib", "v1.2.0");
        let (remote, _) = testutil::package(dir.path(), &lib, &["v1.0.0", "v1.2.0", "v2.0.0"]);
        regs.add_package("reg", remote.to_str().unwrap()).unwrap();
        let project_dir = testutil::project_dir(dir.path(), &[("lib", "v1.0.0")]);

        upgrade(&project_dir, &regs, Some("lib"), None, false, false).unwrap();
        assert_eq!(load(&project_dir).find_dependency("lib").unwrap().version, "v1.2.0");

        upgrade(&project_dir, &regs, None, None, true, true).unwrap();
        assert_eq!(load(&project_dir).find_dependency("lib").unwrap().version, "v2.0.0");

        downgrade(&project_dir, &regs, "lib", "v1.0.0").unwrap();
        assert_eq!(load(&project_dir).find_dependency("lib").unwrap().version, "v1.0.0");

        assert!(downgrade(&project_dir, &regs, "lib", "v1.2.0").is_err());
        assert!(downgrade(&project_dir, &regs, "lib", "v0.5.0").is_err());
        assert!(upgrade(&project_dir, &regs, Some("lib"), None, true, false).is_err());
        assert!(upgrade(&project_dir, &regs, Some("nope"), None, false, false).is_err());
    }
}
