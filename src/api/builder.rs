use std::{env, error::Error, path::PathBuf};

use home::home_dir;
use log::debug;

use crate::{
    git::GitCache,
    model::vcs::VcsType,
    resolver::{GitDependencyManager, InstallerRegistry, MercurialDependencyManager},
    Gofetch,
};

#[derive(Default)]
pub struct GofetchBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    module_file_name: Option<PathBuf>,
    lock_file_name: Option<PathBuf>,
    cache_directory_path: Option<PathBuf>,
    output_directory_name: Option<PathBuf>,
    default_vcs: Option<VcsType>,
    registry: Option<InstallerRegistry>,
}

impl GofetchBuilder {
    /// Project root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the module file declaring the dependencies.
    ///
    /// Defaults to `gofetch.toml`.
    pub fn module_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_file_name = Some(path.into());
        self
    }

    /// Name of the lock file.
    ///
    /// Defaults to `gofetch.lock`.
    pub fn lock_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file_name = Some(path.into());
        self
    }

    /// Directory the dependency sources are installed into.
    ///
    /// Defaults to `vendor`.
    pub fn output_directory_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_directory_name = Some(path.into());
        self
    }

    /// Location of the repository cache.
    ///
    /// Defaults to `$HOME/.gofetch/cache`.
    pub fn cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_directory_path = Some(path.into());
        self
    }

    /// Vcs of declarations that do not name one.
    ///
    /// Defaults to git.
    pub fn default_vcs(mut self, vcs: VcsType) -> Self {
        self.default_vcs = Some(vcs);
        self
    }

    /// Replaces the git and mercurial dependency managers.
    pub fn registry(mut self, registry: InstallerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn try_build(self) -> Result<Gofetch, Box<dyn Error>> {
        let Self {
            root,
            module_file_name,
            lock_file_name,
            cache_directory_path,
            output_directory_name,
            default_vcs,
            registry,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let module_file_name = module_file_name.unwrap_or_else(|| PathBuf::from("gofetch.toml"));

        let lock_file_name = lock_file_name.unwrap_or_else(|| PathBuf::from("gofetch.lock"));

        let output_directory_name =
            output_directory_name.unwrap_or_else(|| PathBuf::from("vendor"));

        let cache_directory = match cache_directory_path {
            Some(path) => root.join(path),
            None => default_cache_directory()?,
        };
        debug!("Using cache directory {}", cache_directory.display());

        let registry = match registry {
            Some(registry) => registry,
            None => {
                let git_config = git2::Config::open_default()?;
                let git_cache = GitCache::new(cache_directory.join("git"), git_config)?;
                let mercurial = MercurialDependencyManager::new(cache_directory.join("hg"))?;
                InstallerRegistry::new()
                    .register(VcsType::Git, GitDependencyManager::new(git_cache))
                    .register(VcsType::Mercurial, mercurial)
            }
        };

        Ok(Gofetch {
            registry,
            root,
            module_file_name,
            lock_file_name,
            output_directory_name,
            cache_directory,
            default_vcs: default_vcs.unwrap_or(VcsType::Git),
        })
    }
}

fn default_cache_directory() -> Result<PathBuf, Box<dyn Error>> {
    let mut cache_directory =
        home_dir().ok_or("Could not find home dir. Please define $HOME env variable.")?;
    cache_directory.push(".gofetch/cache");
    Ok(cache_directory)
}
