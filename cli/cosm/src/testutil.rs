//! Fixtures for command tests that need a real `git`.

use std::path::{Path, PathBuf};

use cosm_registry::{CosmHome, Git, Identity, Project, Registries, PROJECT_FILE};

pub fn git() -> Git {
    Git::default().with_identity(Identity {
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    })
}

pub fn registries(root: &Path) -> Registries {
    Registries::new(CosmHome::new(root.join(".cosm")), git())
}

pub fn bare_remote(root: &Path, name: &str) -> PathBuf {
    let path = root.join(format!("{name}.git"));
    let path_str = path.to_string_lossy().into_owned();
    git()
        .run(Some(root), "init", &["--bare", path_str.as_str()])
        .unwrap();
    path
}

/// A registry named `name` backed by a fresh bare remote.
pub fn registry(root: &Path, regs: &Registries, name: &str) {
    let remote = bare_remote(root, name);
    regs.init(name, remote.to_str().unwrap()).unwrap();
}

/// Push a package with the given tags and return its work clone.
///
/// The work clone tracks the remote, so it can be released from.
pub fn package(root: &Path, project: &Project, tags: &[&str]) -> (PathBuf, PathBuf) {
    let remote = bare_remote(root, &format!("{}-src", project.name));
    let work = root.join(format!("{}-work", project.name));
    let git = git();
    git.clone_into(remote.to_str().unwrap(), &work).unwrap();
    project.save(&work).unwrap();
    git.stage(&work, &[PROJECT_FILE]).unwrap();
    git.commit(&work, "Initial project").unwrap();
    let branch = git.current_branch(&work).unwrap();
    git.push(&work, &branch, false).unwrap();
    for tag in tags {
        git.create_tag(&work, tag).unwrap();
        git.push(&work, tag, false).unwrap();
    }
    (remote, work)
}

/// A project directory with a manifest and the given dependencies.
pub fn project_dir(root: &Path, deps: &[(&str, &str)]) -> PathBuf {
    let dir = root.join("consumer");
    std::fs::create_dir_all(&dir).unwrap();
    let mut project = Project::new("consumer", "v0.1.0");
    for (name, version) in deps {
        project.add_dependency(name, version).unwrap();
    }
    project.save(&dir).unwrap();
    dir
}
