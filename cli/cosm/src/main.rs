//! cosm CLI — package manager with Git-backed registries.

mod commands;
#[cfg(test)]
mod testutil;

use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use cosm_registry::{Bump, CosmHome, Registries};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "COSM_LOG";

#[derive(Parser)]
#[command(name = "cosm", version, about = "A cosmic package manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with a Project.json file
    Init {
        /// Package name
        name: String,
        /// Initial version (default: v0.1.0)
        #[arg(long, short = 'v')]
        version: Option<String>,
        /// Project language (e.g., lua, terra)
        #[arg(long, short = 'l')]
        language: Option<String>,
    },
    /// Add a dependency to the project
    Add {
        /// Package name, or <name>@v<version>
        name: String,
        /// Version tag (e.g., v1.2.3)
        version: Option<String>,
    },
    /// Remove a dependency from the project
    Rm {
        /// Package name
        name: String,
    },
    /// Update the project version and publish a release
    Release {
        /// Explicit version tag (e.g., v1.0.0)
        version: Option<String>,
        /// Increment the patch version
        #[arg(long)]
        patch: bool,
        /// Increment the minor version
        #[arg(long)]
        minor: bool,
        /// Increment the major version
        #[arg(long)]
        major: bool,
        /// Also publish the release to this registry
        #[arg(long)]
        registry: Option<String>,
    },
    /// Switch an existing dependency to development mode
    Develop {
        /// Package name
        name: String,
    },
    /// Close development mode for an existing dependency
    Free {
        /// Package name
        name: String,
    },
    /// Upgrade a dependency or all dependencies
    Upgrade {
        /// Package name (omit with --all)
        name: Option<String>,
        /// Version constraint: vX, vX.Y or vX.Y.Z
        constraint: Option<String>,
        /// Upgrade all direct dependencies
        #[arg(long)]
        all: bool,
        /// Allow crossing major versions
        #[arg(long)]
        latest: bool,
    },
    /// Downgrade a dependency to an older version
    Downgrade {
        /// Package name
        name: String,
        /// Version tag to pin
        version: String,
    },
    /// Show the project in the current directory
    Status,
    /// Manage package registries
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },
}

#[derive(Subcommand)]
enum RegistryAction {
    /// Print an overview of packages in a registry
    Status {
        /// Registry name
        name: String,
    },
    /// Initialize a new registry backed by an empty Git repository
    Init {
        /// Registry name
        name: String,
        /// Git URL of the empty repository
        giturl: String,
    },
    /// Clone a registry from a Git URL
    Clone {
        /// Git URL of the registry
        giturl: String,
    },
    /// Pull the latest state of a registry from its remote
    Update {
        /// Registry name (omit with --all)
        name: Option<String>,
        /// Update all registries
        #[arg(long)]
        all: bool,
    },
    /// Delete a local registry
    Delete {
        /// Registry name
        name: String,
        /// Delete even with uncommitted changes
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Register a package and its version tags in a registry
    Add {
        /// Registry name
        name: String,
        /// Git URL of the package
        giturl: String,
    },
    /// Remove a package or a single version from a registry
    Rm {
        /// Registry name
        name: String,
        /// Package name
        package: String,
        /// Version tag; removes the whole package when omitted
        version: Option<String>,
        /// Allow removing the last version and delete cached clones
        #[arg(long, short = 'f')]
        force: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr, filtered by `COSM_LOG` (default: warnings only).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Registries under the cosm home, with git configured from `config.toml`.
fn open_registries() -> anyhow::Result<Registries> {
    let home = CosmHome::locate()?;
    let config = home
        .load_config()
        .with_context(|| format!("loading {}", home.config_path().display()))?;
    Ok(Registries::new(home, config.git()))
}

fn bump_from_flags(patch: bool, minor: bool, major: bool) -> anyhow::Result<Option<Bump>> {
    match (patch, minor, major) {
        (false, false, false) => Ok(None),
        (true, false, false) => Ok(Some(Bump::Patch)),
        (false, true, false) => Ok(Some(Bump::Minor)),
        (false, false, true) => Ok(Some(Bump::Major)),
        _ => bail!("only one of --patch, --minor, or --major may be given"),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("reading the current directory")?;

    match cli.command {
        Commands::Init {
            name,
            version,
            language,
        } => {
            let regs = open_registries()?;
            commands::init::run(
                &cwd,
                regs.git(),
                &name,
                version.as_deref(),
                language.as_deref(),
            )
        }

        Commands::Add { name, version } => {
            let regs = open_registries()?;
            commands::deps::add(&cwd, &regs, &name, version.as_deref())
        }

        Commands::Rm { name } => commands::deps::remove(&cwd, &name),

        Commands::Release {
            version,
            patch,
            minor,
            major,
            registry,
        } => {
            let bump = bump_from_flags(patch, minor, major)?;
            let regs = open_registries()?;
            commands::release::run(&cwd, &regs, version.as_deref(), bump, registry.as_deref())
        }

        Commands::Develop { name } => commands::deps::develop(&cwd, &name),

        Commands::Free { name } => commands::deps::free(&cwd, &name),

        Commands::Upgrade {
            name,
            constraint,
            all,
            latest,
        } => {
            let regs = open_registries()?;
            commands::deps::upgrade(
                &cwd,
                &regs,
                name.as_deref(),
                constraint.as_deref(),
                all,
                latest,
            )
        }

        Commands::Downgrade { name, version } => {
            let regs = open_registries()?;
            commands::deps::downgrade(&cwd, &regs, &name, &version)
        }

        Commands::Status => commands::status::run(&cwd),

        Commands::Registry { action } => {
            let regs = open_registries()?;
            match action {
                RegistryAction::Status { name } => commands::registry::status(&regs, &name),
                RegistryAction::Init { name, giturl } => {
                    commands::registry::init(&regs, &name, &giturl)
                }
                RegistryAction::Clone { giturl } => commands::registry::clone(&regs, &giturl),
                RegistryAction::Update { name, all } => {
                    commands::registry::update(&regs, name.as_deref(), all)
                }
                RegistryAction::Delete { name, force } => {
                    commands::registry::delete(&regs, &name, force)
                }
                RegistryAction::Add { name, giturl } => {
                    commands::registry::add(&regs, &name, &giturl)
                }
                RegistryAction::Rm {
                    name,
                    package,
                    version,
                    force,
                } => commands::registry::remove(
                    &regs,
                    &name,
                    &package,
                    version.as_deref(),
                    force,
                ),
            }
        }
    }
}
