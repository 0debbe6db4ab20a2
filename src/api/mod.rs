use std::{error::Error, path::PathBuf};

use crate::{
    cli::command_handlers::{do_clear_cache, do_fetch, do_lock, do_show},
    model::vcs::VcsType,
    resolver::InstallerRegistry,
};

mod builder;

pub use builder::GofetchBuilder;

pub struct Gofetch {
    registry: InstallerRegistry,
    root: PathBuf,
    module_file_name: PathBuf,
    lock_file_name: PathBuf,
    output_directory_name: PathBuf,
    cache_directory: PathBuf,
    default_vcs: VcsType,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LockMode {
    /// Verify that the lock file is up to date. This mode should be normally used on CI.
    Locked,
    /// Update the lock file if necessary.
    Update,
    /// Recreate the lock file from scratch.
    Recreate,
}

impl Gofetch {
    pub fn builder() -> GofetchBuilder {
        GofetchBuilder::default()
    }

    /// Resolves the dependencies and installs their sources into the output directory
    pub fn fetch(&self, lock_mode: LockMode) -> Result<(), Box<dyn Error>> {
        do_fetch(
            lock_mode,
            &self.registry,
            &self.root,
            &self.module_file_name,
            &self.lock_file_name,
            &self.output_directory_name,
            self.default_vcs,
        )
    }

    /// Creates, updates or verifies the lock file based on the module file
    pub fn lock(&self, lock_mode: LockMode) -> Result<(), Box<dyn Error>> {
        do_lock(
            lock_mode,
            &self.registry,
            &self.root,
            &self.module_file_name,
            &self.lock_file_name,
            self.default_vcs,
        )?;
        Ok(())
    }

    /// One `<name> <version>` line per resolved dependency
    pub fn show(&self, lock_mode: LockMode) -> Result<Vec<String>, Box<dyn Error>> {
        do_show(
            lock_mode,
            &self.registry,
            &self.root,
            &self.module_file_name,
            &self.lock_file_name,
            self.default_vcs,
        )
    }

    pub fn clear_cache(&self) -> Result<(), Box<dyn Error>> {
        do_clear_cache(&self.cache_directory)
    }
}
