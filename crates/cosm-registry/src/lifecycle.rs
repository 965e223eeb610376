//! Creating, cloning, synchronizing and deleting registries.

use std::path::{Path, PathBuf};

use crate::cache::CloneCache;
use crate::error::{RegistryError, Result};
use crate::git::Git;
use crate::home::CosmHome;
use crate::registry::{self, Registry, VersionCatalog, REGISTRY_FILE};

/// Handle on every registry known to a cosm home.
#[derive(Debug, Clone)]
pub struct Registries {
    pub(crate) home: CosmHome,
    pub(crate) git: Git,
}

/// Snapshot of one registry for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStatus {
    pub registry: Registry,
    pub packages: Vec<PackageStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStatus {
    pub name: String,
    pub uuid: String,
    pub versions: Vec<String>,
}

/// Removes a directory on drop unless disarmed.
struct RemoveOnDrop {
    path: PathBuf,
    armed: bool,
}

impl RemoveOnDrop {
    fn new(path: PathBuf) -> Self {
        RemoveOnDrop { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        if !self.armed || !self.path.exists() {
            return;
        }
        tracing::debug!("rolling back {}", self.path.display());
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::warn!("failed to clean up {}: {e}", self.path.display());
        }
    }
}

impl Registries {
    pub fn new(home: CosmHome, git: Git) -> Self {
        Registries { home, git }
    }

    pub fn home(&self) -> &CosmHome {
        &self.home
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    pub fn clone_cache(&self) -> CloneCache {
        CloneCache::new(self.home.clones_dir())
    }

    /// Names of all registries, in index order.
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.home.load_index()?.names().to_vec())
    }

    /// Resolve an indexed registry to its working copy and descriptor.
    pub fn open(&self, name: &str) -> Result<(PathBuf, Registry)> {
        self.home.load_index()?.require(name)?;
        let dir = self.home.registry_dir(name);
        let registry = Registry::load(&dir)?;
        Ok((dir, registry))
    }

    /// Like [`open`](Self::open), but pulls the working copy before the
    /// descriptor is read. Every write path starts here.
    pub(crate) fn open_synced(&self, name: &str) -> Result<(PathBuf, Registry)> {
        self.home.load_index()?.require(name)?;
        let dir = self.home.registry_dir(name);
        self.pull(&dir)?;
        let registry = Registry::load(&dir)?;
        Ok((dir, registry))
    }

    /// Create a registry backed by the empty repository at `git_url`.
    ///
    /// The registry is only added to the index after its initial commit has
    /// been pushed; any earlier failure removes the local clone.
    pub fn init(&self, name: &str, git_url: &str) -> Result<Registry> {
        if name.is_empty() {
            return Err(RegistryError::invalid("registry name cannot be empty"));
        }
        if git_url.is_empty() {
            return Err(RegistryError::invalid("git URL cannot be empty"));
        }
        self.home.ensure_layout()?;
        let mut index = self.home.load_index()?;
        if index.contains(name) {
            return Err(RegistryError::RegistryExists {
                name: name.to_string(),
            });
        }
        let dir = self.home.registry_dir(name);
        if dir.exists() {
            return Err(RegistryError::invalid(format!(
                "registry directory {} already exists",
                dir.display()
            )));
        }

        let guard = RemoveOnDrop::new(dir.clone());
        self.git.clone_into(git_url, &dir)?;
        ensure_only_git_metadata(&dir, git_url)?;

        let registry = Registry::new(name, git_url);
        registry.save(&dir)?;
        self.git.stage(&dir, &[REGISTRY_FILE])?;
        self.git
            .commit(&dir, &format!("Initialized registry {name}"))?;
        let branch = self.git.current_branch(&dir)?;
        self.git.push(&dir, &branch, false)?;

        index.add(name)?;
        index.save()?;
        guard.disarm();

        tracing::info!("initialized registry '{name}' at {}", dir.display());
        Ok(registry)
    }

    /// Add an existing registry from its Git URL.
    ///
    /// The registry's name is taken from its `registry.json`.
    pub fn clone_registry(&self, git_url: &str) -> Result<Registry> {
        if git_url.is_empty() {
            return Err(RegistryError::invalid("git URL cannot be empty"));
        }
        self.home.ensure_layout()?;
        let clone = self.clone_cache().clone_temp(&self.git, git_url)?;
        let registry = Registry::load(clone.path())?;

        let mut index = self.home.load_index()?;
        if index.contains(&registry.name) {
            return Err(RegistryError::RegistryExists {
                name: registry.name.clone(),
            });
        }
        let dest = self.home.registry_dir(&registry.name);
        if dest.exists() {
            return Err(RegistryError::invalid(format!(
                "registry directory {} already exists",
                dest.display()
            )));
        }
        std::fs::rename(clone.path(), &dest).map_err(RegistryError::io(&dest))?;
        let guard = RemoveOnDrop::new(dest.clone());

        index.add(&registry.name)?;
        index.save()?;
        guard.disarm();

        tracing::info!("cloned registry '{}' from {git_url}", registry.name);
        Ok(registry)
    }

    /// Pull the latest state of one registry from its remote.
    pub fn update(&self, name: &str) -> Result<()> {
        self.home.load_index()?.require(name)?;
        self.pull(&self.home.registry_dir(name))
    }

    /// Pull every registry; returns the names updated.
    pub fn update_all(&self) -> Result<Vec<String>> {
        let names = self.names()?;
        for name in &names {
            self.pull(&self.home.registry_dir(name))?;
        }
        Ok(names)
    }

    pub(crate) fn pull(&self, dir: &Path) -> Result<()> {
        let branch = self.git.current_branch(dir)?;
        self.git.pull(dir, &branch)
    }

    /// Stage everything, commit, and push the current branch.
    pub(crate) fn commit_and_push(&self, dir: &Path, message: &str) -> Result<()> {
        self.git.stage(dir, &["."])?;
        self.git.commit(dir, message)?;
        let branch = self.git.current_branch(dir)?;
        self.git.push(dir, &branch, false)
    }

    /// Forget a registry and delete its working copy.
    ///
    /// Without `force` the working copy must have no uncommitted changes.
    pub fn delete(&self, name: &str, force: bool) -> Result<()> {
        let mut index = self.home.load_index()?;
        index.require(name)?;
        let dir = self.home.registry_dir(name);
        if !force && dir.exists() {
            self.git.ensure_clean(&dir)?;
        }
        index.remove(name)?;
        index.save()?;
        if dir.exists() {
            std::fs::remove_dir_all(&dir).map_err(RegistryError::io(&dir))?;
        }
        tracing::info!("deleted registry '{name}'");
        Ok(())
    }

    /// Packages of a registry with their catalogs, sorted by name.
    pub fn status(&self, name: &str) -> Result<RegistryStatus> {
        let (dir, registry) = self.open(name)?;
        let mut packages = Vec::with_capacity(registry.packages.len());
        for (pkg, uuid) in &registry.packages {
            let catalog = VersionCatalog::load(&registry::package_dir(&dir, pkg)?)?;
            packages.push(PackageStatus {
                name: pkg.clone(),
                uuid: uuid.clone(),
                versions: catalog.versions().to_vec(),
            });
        }
        Ok(RegistryStatus { registry, packages })
    }
}

/// Fail unless `dir` holds nothing but `.git`.
fn ensure_only_git_metadata(dir: &Path, git_url: &str) -> Result<()> {
    for entry in std::fs::read_dir(dir).map_err(RegistryError::io(dir))? {
        let entry = entry.map_err(RegistryError::io(dir))?;
        let file_name = entry.file_name();
        if file_name != ".git" {
            return Err(RegistryError::NotEmpty {
                url: git_url.to_string(),
                dir: dir.to_path_buf(),
                entry: file_name.to_string_lossy().into_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn registries(root: &Path) -> Registries {
        Registries::new(testutil::home(root), testutil::git())
    }

    #[test]
    fn init_writes_index_and_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let remote = testutil::bare_remote(dir.path(), "myreg");
        let url = remote.to_str().unwrap();
        let regs = registries(dir.path());

        let created = regs.init("myreg", url).unwrap();
        assert_eq!(regs.names().unwrap(), vec!["myreg"]);

        let on_disk = Registry::load(&regs.home().registry_dir("myreg")).unwrap();
        assert_eq!(on_disk, created);
        assert_eq!(on_disk.name, "myreg");
        assert_eq!(on_disk.git_url, url);
        assert!(on_disk.packages.is_empty());
        assert!(uuid::Uuid::parse_str(&on_disk.uuid).is_ok());

        // The initial commit reached the remote.
        let check = dir.path().join("check");
        testutil::git().clone_into(url, &check).unwrap();
        assert!(check.join(REGISTRY_FILE).is_file());
    }

    #[test]
    fn init_duplicate_leaves_index_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let remote = testutil::bare_remote(dir.path(), "dup");
        let regs = registries(dir.path());
        regs.init("dup", remote.to_str().unwrap()).unwrap();

        let before = std::fs::read(regs.home().index_path()).unwrap();
        let err = regs.init("dup", "https://git.example.com").unwrap_err();
        assert!(matches!(err, RegistryError::RegistryExists { .. }));
        assert_eq!(std::fs::read(regs.home().index_path()).unwrap(), before);
    }

    #[test]
    fn init_rejects_empty_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let regs = registries(dir.path());
        assert!(regs.init("", "url").is_err());
        assert!(regs.init("name", "").is_err());
        assert!(!regs.home().index_path().exists());
    }

    #[test]
    fn init_non_empty_repo_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let remote = testutil::bare_remote(dir.path(), "busy");
        let work = dir.path().join("busy-work");
        let git = testutil::git();
        git.clone_into(remote.to_str().unwrap(), &work).unwrap();
        testutil::commit_file(&work, "README.md", "not a registry");
        let branch = git.current_branch(&work).unwrap();
        git.push(&work, &branch, false).unwrap();

        let regs = registries(dir.path());
        let err = regs.init("busy", remote.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, RegistryError::NotEmpty { .. }));
        assert!(!regs.home().registry_dir("busy").exists());
        assert!(regs.names().unwrap().is_empty());
    }

    #[test]
    fn init_unreachable_url_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let regs = registries(dir.path());
        let missing = dir.path().join("nowhere.git");
        assert!(regs.init("ghost", missing.to_str().unwrap()).is_err());
        assert!(!regs.home().registry_dir("ghost").exists());
        assert!(regs.names().unwrap().is_empty());
    }

    #[test]
    fn clone_update_delete() {
        let dir = tempfile::tempdir().unwrap();
        let remote = testutil::bare_remote(dir.path(), "shared");
        let url = remote.to_str().unwrap();

        let first = registries(&dir.path().join("alice"));
        first.init("shared", url).unwrap();

        let second = registries(&dir.path().join("bob"));
        let cloned = second.clone_registry(url).unwrap();
        assert_eq!(cloned.name, "shared");
        assert_eq!(second.names().unwrap(), vec!["shared"]);
        assert!(matches!(
            second.clone_registry(url),
            Err(RegistryError::RegistryExists { .. })
        ));

        second.update("shared").unwrap();
        assert_eq!(second.update_all().unwrap(), vec!["shared"]);
        assert!(matches!(
            second.update("other"),
            Err(RegistryError::RegistryNotFound { .. })
        ));

        let working_copy = second.home().registry_dir("shared");
        std::fs::write(working_copy.join("scratch.txt"), "x").unwrap();
        assert!(matches!(
            second.delete("shared", false),
            Err(RegistryError::UncommittedChanges { .. })
        ));
        second.delete("shared", true).unwrap();
        assert!(!working_copy.exists());
        assert!(second.names().unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_registry() {
        let dir = tempfile::tempdir().unwrap();
        let regs = registries(dir.path());
        assert!(matches!(
            regs.delete("nope", false),
            Err(RegistryError::RegistryNotFound { .. })
        ));
    }

    #[test]
    fn status_of_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let remote = testutil::bare_remote(dir.path(), "st");
        let regs = registries(dir.path());
        regs.init("st", remote.to_str().unwrap()).unwrap();
        let status = regs.status("st").unwrap();
        assert_eq!(status.registry.name, "st");
        assert!(status.packages.is_empty());
        assert!(regs.status("missing").is_err());
    }
}
