//! `cosm init` — create a `Project.json`.

use std::path::Path;

use anyhow::{bail, Result};
use cosm_registry::{Git, Project, RegistryError, DEFAULT_VERSION};

/// Run `cosm init <name> [--version v] [--language l]` in `project_dir`.
pub fn run(
    project_dir: &Path,
    git: &Git,
    name: &str,
    version: Option<&str>,
    language: Option<&str>,
) -> Result<()> {
    let project = create_project(project_dir, git, name, version, language)?;
    println!(
        "Initialized project '{}' with version {}",
        project.name, project.version
    );
    Ok(())
}

pub(crate) fn create_project(
    project_dir: &Path,
    git: &Git,
    name: &str,
    version: Option<&str>,
    language: Option<&str>,
) -> Result<Project> {
    if name.is_empty() {
        bail!("package name cannot be empty");
    }
    if Project::exists(project_dir) {
        return Err(RegistryError::ProjectExists {
            dir: project_dir.to_path_buf(),
        }
        .into());
    }
    let version = version.unwrap_or(DEFAULT_VERSION);
    if !version.starts_with('v') {
        bail!("version '{version}' must start with 'v'");
    }
    cosm_registry::parse_version(version)?;

    let mut project = Project::new(name, version);
    project.authors = git.authors();
    project.language = language.filter(|l| !l.is_empty()).map(str::to_string);
    project.save(project_dir)?;
    Ok(project)
}
