//! `cosm release` — bump the project version and tag it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use cosm_registry::git;
use cosm_registry::version::{self, Bump};
use cosm_registry::{Project, Registries, PROJECT_FILE};

/// Compute the release tag from an explicit version or a bump.
fn next_version(current: &str, explicit: Option<&str>, bump: Option<Bump>) -> Result<String> {
    let current_version = version::parse_version(current)
        .with_context(|| format!("current project version '{current}' is invalid"))?;
    let next = match (explicit, bump) {
        (Some(v), None) => {
            if !v.starts_with('v') {
                bail!("version '{v}' must start with 'v'");
            }
            version::parse_version(v)?
        }
        (None, Some(kind)) => version::bump(&current_version, kind),
        _ => bail!(
            "Must specify either a version (v<version>) or one of --patch, --minor, or --major"
        ),
    };
    let tag = version::format_tag(&next);
    if next <= current_version {
        bail!("new version '{tag}' must be greater than current version '{current}'");
    }
    Ok(tag)
}

/// Run `cosm release [v<version>] [--patch|--minor|--major] [--registry <name>]`.
pub fn run(
    project_dir: &Path,
    regs: &Registries,
    explicit: Option<&str>,
    bump: Option<Bump>,
    registry: Option<&str>,
) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    let tag = next_version(&project.version, explicit, bump)?;
    let is_repo = git::is_repository(project_dir);
    if registry.is_some() && !is_repo {
        bail!(
            "releasing to a registry requires a git repository: {} is not one",
            project_dir.display()
        );
    }

    let git = regs.git();
    let has_origin = is_repo && git.remote_url(project_dir).is_ok();
    if is_repo {
        git.ensure_clean(project_dir)?;
        if has_origin {
            git.ensure_in_sync(project_dir)?;
        }
    }

    project.version = tag.clone();
    project.save(project_dir)?;

    if is_repo {
        git.stage(project_dir, &[PROJECT_FILE])?;
        git.commit(project_dir, &format!("Release {tag}"))?;
        git.create_tag(project_dir, &tag)?;
        if has_origin {
            let branch = git.current_branch(project_dir)?;
            git.push(project_dir, &branch, false)?;
            git.push(project_dir, &tag, false)?;
        } else {
            tracing::warn!("no origin remote in {}; release is local only", project_dir.display());
        }
    }

    if let Some(registry) = registry {
        regs.publish_release(registry, project_dir, &project, &tag)
            .with_context(|| format!("publishing {tag} to registry '{registry}'"))?;
        println!("Released '{}' {tag} to registry '{registry}'", project.name);
    } else {
        println!("Released '{}' {tag}", project.name);
    }
    Ok(())
}
