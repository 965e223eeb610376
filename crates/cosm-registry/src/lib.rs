//! Git-backed package registries and project manifests for cosm.
//!
//! A registry is an ordinary Git repository holding a descriptor, a version
//! catalog per package, and one immutable spec per published version. Every
//! mutation is committed and pushed, so the remote is the source of truth and
//! any number of users can clone the same registry.
//!
//! # Architecture
//!
//! - **Documents** — [`Project`], [`Registry`], [`VersionCatalog`], [`VersionSpec`]
//! - **Git proxy** — [`Git`] runs the external executable in explicit directories
//! - **Workflows** — [`Registries`] creates, clones, syncs and edits registries
//!
//! Local state lives under the cosm home ([`CosmHome`]): the registries index,
//! registry working copies, and a cache of package clones keyed by UUID.

pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod home;
pub mod lifecycle;
pub mod project;
pub mod publish;
pub mod registry;
pub mod remove;
pub mod resolution;
pub mod store;
pub mod version;

#[cfg(test)]
mod testutil;

// Re-exports for convenience.
pub use cache::{CloneCache, TempClone};
pub use config::CosmConfig;
pub use error::{RegistryError, Result};
pub use git::{Git, Identity};
pub use home::CosmHome;
pub use lifecycle::{PackageStatus, Registries, RegistryStatus};
pub use project::{Dependency, Project, DEFAULT_VERSION, PROJECT_FILE};
pub use publish::RegisteredPackage;
pub use registry::{Registry, RegistriesIndex, VersionCatalog, VersionSpec};
pub use remove::VersionRemoval;
pub use resolution::{check_downgrade, select_upgrade, PackageLocation};
pub use version::{parse_version, Bump, Version};
