//! Shared fixtures for tests that drive a real `git`.

use std::path::{Path, PathBuf};

use crate::git::{Git, Identity};
use crate::home::CosmHome;
use crate::project::Project;

pub const NAME: &str = "Test User";
pub const EMAIL: &str = "test@example.com";

/// A git handle with a fixed commit identity.
pub fn git() -> Git {
    Git::default().with_identity(Identity {
        name: NAME.to_string(),
        email: EMAIL.to_string(),
    })
}

/// A cosm home rooted inside `root`.
pub fn home(root: &Path) -> CosmHome {
    CosmHome::new(root.join(".cosm"))
}

/// Create an empty bare repository to act as a remote.
pub fn bare_remote(root: &Path, name: &str) -> PathBuf {
    let path = root.join(format!("{name}.git"));
    let path_str = path.to_string_lossy().into_owned();
    git()
        .run(Some(root), "init", &["--bare", path_str.as_str()])
        .unwrap();
    path
}

/// Create a non-bare repository with one commit.
pub fn work_repo(root: &Path, name: &str) -> PathBuf {
    let path = root.join(name);
    let path_str = path.to_string_lossy().into_owned();
    git().run(Some(root), "init", &[path_str.as_str()]).unwrap();
    commit_file(&path, "README.md", name);
    path
}

/// Write a file, stage it, and commit.
pub fn commit_file(repo: &Path, file: &str, contents: &str) {
    std::fs::write(repo.join(file), contents).unwrap();
    let git = git();
    git.stage(repo, &[file]).unwrap();
    git.commit(repo, &format!("Add {file}")).unwrap();
}

/// Publish a package source: a bare remote whose default branch holds a
/// `Project.json` for `project`, optionally with extra tags.
pub fn package_remote(root: &Path, project: &Project, tags: &[&str]) -> PathBuf {
    package_remote_at(root, &project.name, project, tags)
}

/// Like [`package_remote`], with repository paths derived from `stem`
/// instead of the package name.
pub fn package_remote_at(root: &Path, stem: &str, project: &Project, tags: &[&str]) -> PathBuf {
    let remote = bare_remote(root, &format!("{stem}-src"));
    let work = root.join(format!("{stem}-work"));
    let git = git();
    git.clone_into(remote.to_str().unwrap(), &work).unwrap();
    project.save(&work).unwrap();
    git.stage(&work, &[crate::project::PROJECT_FILE]).unwrap();
    git.commit(&work, "Initial project").unwrap();
    let branch = git.current_branch(&work).unwrap();
    git.push(&work, &branch, false).unwrap();
    for tag in tags {
        git.create_tag(&work, tag).unwrap();
        git.push(&work, tag, false).unwrap();
    }
    remote
}

/// A valid project manifest for tests.
pub fn project(name: &str, version: &str) -> Project {
    let mut project = Project::new(name, version);
    project.authors = vec![format!("[{NAME}]{EMAIL}")];
    project
}
