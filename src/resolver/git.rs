use std::path::Path;

use log::info;

use crate::{
    git::GitCache,
    model::{notation::NotationDependency, resolved::VcsResolvedDependency, vcs::VcsType},
};

use super::DependencyManager;

pub struct GitDependencyManager {
    cache: GitCache,
}

impl GitDependencyManager {
    pub fn new(cache: GitCache) -> Self {
        GitDependencyManager { cache }
    }
}

impl DependencyManager for GitDependencyManager {
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency> {
        info!("Fetching {} from {}", notation.name, notation.url);
        let repository = self.cache.repository(&notation.url)?;
        repository.fetch()?;
        let commit = repository.resolve_commit(notation)?;

        Ok(VcsResolvedDependency::builder(VcsType::Git)
            .url(&notation.url)
            .notation_dependency(notation)
            .commit_id(commit.commit_id)
            .commit_time(commit.commit_time)
            .build()?)
    }

    fn install(&self, dependency: &VcsResolvedDependency, target: &Path) -> anyhow::Result<()> {
        info!("Installing {} into {}", dependency, target.display());
        let repository = self.cache.repository(dependency.url())?;
        repository.fetch_commit(dependency.commit_id())?;
        repository.checkout(dependency.commit_id(), dependency.subpackages(), target)?;
        Ok(())
    }
}
