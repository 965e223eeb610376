//! Registry CLI commands: status, init, clone, update, delete, add, rm.

use anyhow::{bail, Result};
use cosm_registry::{Registries, VersionRemoval};

/// Run `cosm registry status <name>`.
pub fn status(regs: &Registries, name: &str) -> Result<()> {
    let status = regs.status(name)?;
    println!("Registry Status for '{}':", status.registry.name);
    println!("  Git URL: {}", status.registry.git_url);
    if status.packages.is_empty() {
        println!("  No packages registered.");
        return Ok(());
    }
    println!("  Packages:");
    for pkg in &status.packages {
        println!("    - {} (UUID: {})", pkg.name, pkg.uuid);
        if !pkg.versions.is_empty() {
            println!("      versions: {}", pkg.versions.join(", "));
        }
    }
    Ok(())
}

/// Run `cosm registry init <name> <giturl>`.
pub fn init(regs: &Registries, name: &str, git_url: &str) -> Result<()> {
    let registry = regs.init(name, git_url)?;
    println!(
        "Initialized registry '{}' with Git URL: {}",
        registry.name, registry.git_url
    );
    Ok(())
}

/// Run `cosm registry clone <giturl>`.
pub fn clone(regs: &Registries, git_url: &str) -> Result<()> {
    let registry = regs.clone_registry(git_url)?;
    println!("Cloned registry '{}' from {git_url}", registry.name);
    Ok(())
}

/// Run `cosm registry update <name>` or `cosm registry update --all`.
pub fn update(regs: &Registries, name: Option<&str>, all: bool) -> Result<()> {
    match (name, all) {
        (Some(name), false) => {
            regs.update(name)?;
            println!("Updated registry '{name}'");
        }
        (None, true) => {
            let updated = regs.update_all()?;
            tracing::debug!("updated {} registries", updated.len());
            println!("Updated all registries");
        }
        (Some(_), true) => bail!("specify either a registry name or --all, not both"),
        (None, false) => bail!("specify a registry name or --all"),
    }
    Ok(())
}

/// Run `cosm registry delete <name> [--force]`.
pub fn delete(regs: &Registries, name: &str, force: bool) -> Result<()> {
    regs.delete(name, force)?;
    if force {
        println!("Force deleted registry '{name}'");
    } else {
        println!("Deleted registry '{name}'");
    }
    Ok(())
}

/// Run `cosm registry add <name> <package-giturl>`.
pub fn add(regs: &Registries, registry: &str, package_url: &str) -> Result<()> {
    let added = regs.add_package(registry, package_url)?;
    println!(
        "Added package '{}' with UUID '{}' to registry '{registry}' ({})",
        added.name,
        added.uuid,
        added.versions.join(", ")
    );
    Ok(())
}

/// Run `cosm registry rm <name> <package> [v<version>] [--force]`.
pub fn remove(
    regs: &Registries,
    registry: &str,
    package: &str,
    version: Option<&str>,
    force: bool,
) -> Result<()> {
    let prefix = if force { "Force removed" } else { "Removed" };
    match version {
        Some(tag) => {
            let removal = regs.remove_version(registry, package, tag, force)?;
            println!(
                "{prefix} version '{tag}' from package '{package}' in registry '{registry}'"
            );
            if removal == VersionRemoval::Package {
                println!(
                    "Removed package '{package}' from registry '{registry}' (no versions left)"
                );
            }
        }
        None => {
            regs.remove_package(registry, package, force)?;
            println!("{prefix} package '{package}' from registry '{registry}'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use cosm_registry::Project;

    #[test]
    fn init_then_status_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        let remote = testutil::bare_remote(dir.path(), "myreg");
        init(&regs, "myreg", remote.to_str().unwrap()).unwrap();
        status(&regs, "myreg").unwrap();

        let err = init(&regs, "myreg", remote.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("registry 'myreg' already exists"));
        assert!(status(&regs, "other").is_err());
    }

    #[test]
    fn update_argument_rules() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        testutil::registry(dir.path(), &regs, "reg");
        update(&regs, Some("reg"), false).unwrap();
        update(&regs, None, true).unwrap();
        assert!(update(&regs, None, false).is_err());
        assert!(update(&regs, Some("reg"), true).is_err());
        assert!(update(&regs, Some("missing"), false).is_err());
    }

    #[test]
    fn add_and_remove_packages() {
        let dir = tempfile::tempdir().unwrap();
        let regs = testutil::registries(dir.path());
        testutil::registry(dir.path(), &regs, "reg");
        let project = Project::new("pkg", "v1.0.0");
        let (remote, _) = testutil::package(dir.path(), &project, &["v1.0.0", "v1.1.0"]);

        add(&regs, "reg", remote.to_str().unwrap()).unwrap();
        let err = add(&regs, "reg", remote.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("already registered"));

        remove(&regs, "reg", "pkg", Some("v1.0.0"), false).unwrap();
        let err = remove(&regs, "reg", "pkg", Some("v1.1.0"), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        remove(&regs, "reg", "pkg", Some("v1.1.0"), true).unwrap();

        let err = remove(&regs, "reg", "pkg", None, false).unwrap_err();
        assert!(err.to_string().contains("package 'pkg' not found in registry 'reg'"));
    }

    #[test]
    fn clone_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = testutil::registries(&dir.path().join("publisher"));
        let remote = testutil::bare_remote(dir.path(), "shared");
        init(&publisher, "shared", remote.to_str().unwrap()).unwrap();

        let consumer = testutil::registries(&dir.path().join("consumer"));
        clone(&consumer, remote.to_str().unwrap()).unwrap();
        assert_eq!(consumer.names().unwrap(), vec!["shared"]);
        delete(&consumer, "shared", false).unwrap();
        assert!(consumer.names().unwrap().is_empty());
        assert!(delete(&consumer, "shared", true).is_err());
    }
}
