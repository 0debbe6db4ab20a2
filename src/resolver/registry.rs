use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::model::{
    notation::NotationDependency, resolved::VcsResolvedDependency, vcs::VcsType,
};

use super::{DependencyManager, DependencyResolver};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No dependency manager is registered for {0}")]
    MissingInstaller(VcsType),
}

/// Maps every supported vcs to the [`DependencyManager`] that handles it.
#[derive(Default)]
pub struct InstallerRegistry {
    managers: HashMap<VcsType, Box<dyn DependencyManager>>,
}

impl InstallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, vcs: VcsType, manager: impl DependencyManager + 'static) -> Self {
        self.managers.insert(vcs, Box::new(manager));
        self
    }

    pub fn get(&self, vcs: VcsType) -> Result<&dyn DependencyManager, RegistryError> {
        self.managers
            .get(&vcs)
            .map(|manager| manager.as_ref())
            .ok_or(RegistryError::MissingInstaller(vcs))
    }
}

impl DependencyResolver for InstallerRegistry {
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency> {
        debug!("Resolving {} {} from {}", notation.name, notation.requested(), notation.url);
        self.get(notation.vcs)?.resolve(notation)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::Cell, path::Path, rc::Rc};

    use crate::model::{package::PackageRef, subpackages::Subpackages};

    use super::*;

    use pretty_assertions::assert_eq;

    /// Resolves every declaration to a fixed commit and counts the calls.
    pub(crate) struct FakeManager {
        pub vcs: VcsType,
        pub commit_id: String,
        pub calls: Rc<Cell<usize>>,
    }

    impl FakeManager {
        pub(crate) fn new(vcs: VcsType, commit_id: &str) -> Self {
            FakeManager {
                vcs,
                commit_id: commit_id.to_string(),
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl DependencyManager for FakeManager {
        fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency> {
            self.calls.set(self.calls.get() + 1);
            Ok(VcsResolvedDependency::builder(self.vcs)
                .url(&notation.url)
                .notation_dependency(notation)
                .commit_id(notation.commit.clone().unwrap_or_else(|| self.commit_id.clone()))
                .commit_time(1_600_000_000_000)
                .build()?)
        }

        fn install(&self, dependency: &VcsResolvedDependency, target: &Path) -> anyhow::Result<()> {
            std::fs::create_dir_all(target)?;
            std::fs::write(target.join("COMMIT"), dependency.commit_id())?;
            Ok(())
        }
    }

    pub(crate) fn notation(name: &str, vcs: VcsType) -> NotationDependency {
        NotationDependency {
            name: name.to_string(),
            vcs,
            url: vcs.default_url(name),
            tag: None,
            commit: None,
            subpackages: Subpackages::All,
            first_level: true,
            package: PackageRef::root(name),
        }
    }

    #[test]
    fn installer_is_looked_up_by_vcs() {
        let registry = InstallerRegistry::new()
            .register(VcsType::Git, FakeManager::new(VcsType::Git, "1111111111"))
            .register(
                VcsType::Mercurial,
                FakeManager::new(VcsType::Mercurial, "2222222222"),
            );

        let dependency = registry
            .resolve(&notation("bitbucket.org/foo/bar", VcsType::Mercurial))
            .unwrap();
        assert_eq!(dependency.commit_id(), "2222222222");

        let target = tempfile::tempdir().unwrap();
        dependency
            .installer(&registry)
            .unwrap()
            .install(&dependency, target.path())
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(target.path().join("COMMIT")).unwrap(),
            "2222222222"
        );
    }

    #[test]
    fn missing_installer_is_an_error() {
        let registry =
            InstallerRegistry::new().register(VcsType::Git, FakeManager::new(VcsType::Git, "1"));
        let hg_registry = InstallerRegistry::new().register(
            VcsType::Mercurial,
            FakeManager::new(VcsType::Mercurial, "abcdef0123"),
        );
        let dependency = hg_registry
            .resolve(&notation("bitbucket.org/foo/bar", VcsType::Mercurial))
            .unwrap();

        assert_eq!(
            dependency.installer(&registry).err(),
            Some(RegistryError::MissingInstaller(VcsType::Mercurial))
        );
        assert!(registry
            .resolve(&notation("bitbucket.org/foo/bar", VcsType::Mercurial))
            .is_err());
    }
}
