mod git;
mod lock;
mod mercurial;
pub(crate) mod registry;

use std::path::Path;

use crate::model::{notation::NotationDependency, resolved::VcsResolvedDependency};

pub use git::GitDependencyManager;
pub use lock::LockFileResolver;
pub use mercurial::{MercurialDependencyManager, MercurialError};
pub use registry::{InstallerRegistry, RegistryError};

/// Fetches and installs dependencies of one version control system.
pub trait DependencyManager {
    /// Pins a declaration to an exact commit, fetching the repository as needed.
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency>;

    /// Writes the sources of a pinned dependency into `target`.
    fn install(&self, dependency: &VcsResolvedDependency, target: &Path) -> anyhow::Result<()>;
}

pub trait DependencyResolver {
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency>;
}

impl<T> DependencyResolver for &T
where
    T: DependencyResolver,
{
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency> {
        T::resolve(self, notation)
    }
}

/// What a vcs reports for the commit a declaration points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    pub commit_id: String,
    /// Milliseconds since the epoch.
    pub commit_time: i64,
}
