//! Registry error types.

use std::path::{Path, PathBuf};

/// Errors that can occur during project and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A required argument was empty or malformed.
    #[error("{detail}")]
    InvalidArgument { detail: String },

    /// A version string could not be parsed.
    #[error("invalid version '{version}': {detail}")]
    InvalidVersion { version: String, detail: String },

    /// A project manifest failed validation.
    #[error("invalid manifest at '{source_url}': {detail}")]
    InvalidManifest { source_url: String, detail: String },

    /// Registry name is not in the registries index.
    #[error("registry '{name}' not found")]
    RegistryNotFound { name: String },

    /// Registry name is already in the registries index.
    #[error("registry '{name}' already exists")]
    RegistryExists { name: String },

    /// A freshly cloned registry repository was not empty.
    #[error("repository at '{url}' cloned into {} is not empty (contains {entry})", .dir.display())]
    NotEmpty {
        url: String,
        dir: PathBuf,
        entry: String,
    },

    /// Package is not registered in the registry.
    #[error("package '{name}' not found in registry '{registry}'")]
    PackageNotFound { name: String, registry: String },

    /// Package name is already a key of the registry's package map.
    #[error("package '{name}' is already registered in registry '{registry}'")]
    AlreadyRegistered { name: String, registry: String },

    /// Version is not in the package's catalog.
    #[error("version '{version}' not found for package '{name}' in registry '{registry}'")]
    VersionNotFound {
        name: String,
        version: String,
        registry: String,
    },

    /// Version is already in the package's catalog.
    #[error("version '{version}' already exists in registry '{registry}' for package '{name}'")]
    VersionExists {
        name: String,
        version: String,
        registry: String,
    },

    /// Removing the last version of a package needs `--force`.
    #[error("'{version}' is the only version of package '{name}' in registry '{registry}' (use --force to remove it and the package)")]
    LastVersion {
        name: String,
        version: String,
        registry: String,
    },

    /// The project UUID differs from the one the registry recorded.
    #[error("package '{name}' is registered with UUID '{registered}' but the project has UUID '{project}'")]
    UuidMismatch {
        name: String,
        registered: String,
        project: String,
    },

    /// No dependency with that name in the project.
    #[error("dependency '{name}' not found in project")]
    DependencyNotFound { name: String },

    /// The project already depends on this package.
    #[error("dependency '{name}' already exists in project (version {version})")]
    DependencyExists { name: String, version: String },

    /// `free` on a dependency that is not in development mode.
    #[error("dependency '{name}' {version} is not in development mode")]
    NotInDevelopMode { name: String, version: String },

    /// No `Project.json` where one was expected.
    #[error("no Project.json found in {}", .dir.display())]
    ProjectNotFound { dir: PathBuf },

    /// `Project.json` already present where a new project would be created.
    #[error("Project.json already exists in {}", .dir.display())]
    ProjectExists { dir: PathBuf },

    /// Directory is not a Git working copy.
    #[error("{} is not a git repository", .dir.display())]
    NotAGitRepository { dir: PathBuf },

    /// A git command exited unsuccessfully.
    #[error("git {command} failed in {}: {}", display_dir(.dir), .output.trim())]
    Git {
        dir: Option<PathBuf>,
        command: String,
        output: String,
    },

    /// The git executable could not be started.
    #[error("failed to run git {command}: {source}")]
    GitSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Repository has no current branch.
    #[error("repository in {} is in a detached HEAD state", .dir.display())]
    DetachedHead { dir: PathBuf },

    /// Working tree has uncommitted changes.
    #[error("repository has uncommitted changes in {}: please commit or stash them first", .dir.display())]
    UncommittedChanges { dir: PathBuf },

    /// Local branch is behind its remote tracking branch.
    #[error("local repository is behind origin/{branch} in {} by {count} commit(s): please pull changes first", .dir.display())]
    BehindOrigin {
        dir: PathBuf,
        branch: String,
        count: u64,
    },

    /// Home directory could not be determined.
    #[error("could not determine the home directory (set COSM_HOME)")]
    Home,

    /// Filesystem error with path context.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document on disk could not be parsed.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// TOML configuration parse error.
    #[error("failed to parse {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// Build a closure that wraps an I/O error with the offending path.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> RegistryError + '_ {
        move |source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid(detail: impl Into<String>) -> RegistryError {
        RegistryError::InvalidArgument {
            detail: detail.into(),
        }
    }
}

fn display_dir(dir: &Option<PathBuf>) -> String {
    match dir {
        Some(dir) => dir.display().to_string(),
        None => "global scope".to_string(),
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
