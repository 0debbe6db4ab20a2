use log::{debug, info};

use crate::{
    api::LockMode,
    fetch,
    model::{lock::LockFile, notation::Descriptor, resolved::VcsResolvedDependency, vcs::VcsType},
    resolver::{InstallerRegistry, LockFileResolver},
};
use std::{error::Error, path::Path};

/// Handler to fetch command
pub fn do_fetch(
    lock_mode: LockMode,
    registry: &InstallerRegistry,
    root: &Path,
    module_file_name: &Path,
    lock_file_name: &Path,
    output_directory_name: &Path,
    default_vcs: VcsType,
) -> Result<(), Box<dyn Error>> {
    let resolved = do_lock(
        lock_mode,
        registry,
        root,
        module_file_name,
        lock_file_name,
        default_vcs,
    )?;

    let output_directory = root.join(output_directory_name);
    info!(
        "Installing {} dependencies into {}",
        resolved.len(),
        output_directory.display()
    );
    fetch::install(registry, &resolved, &output_directory)?;

    Ok(())
}

/// Handler to lock command
/// Loads the module descriptor, pins every dependency and writes the lock
/// file when it changed
pub fn do_lock(
    lock_mode: LockMode,
    registry: &InstallerRegistry,
    root: &Path,
    module_file_name: &Path,
    lock_file_name: &Path,
    default_vcs: VcsType,
) -> Result<Vec<VcsResolvedDependency>, Box<dyn Error>> {
    let module_descriptor = Descriptor::from_file(&root.join(module_file_name), default_vcs)?;

    let lock_file_path = root.join(lock_file_name);

    let (old_lock, resolved) = match (lock_mode, lock_file_path.exists()) {
        (LockMode::Locked, false) => return Err("Lock file does not exist".into()),

        (LockMode::Locked, true) => {
            let old_lock = LockFile::from_file(&lock_file_path)?;
            let resolver = LockFileResolver::new(registry, &old_lock, true);
            debug!("Verifying lockfile...");
            let resolved = fetch::resolve(&module_descriptor, &resolver)?;
            (Some(old_lock), resolved)
        }

        (LockMode::Update, true) => {
            let old_lock = LockFile::from_file(&lock_file_path)?;
            let resolver = LockFileResolver::new(registry, &old_lock, false);
            debug!("Updating lockfile...");
            let resolved = fetch::resolve(&module_descriptor, &resolver)?;
            (Some(old_lock), resolved)
        }

        (LockMode::Update, false) | (LockMode::Recreate, _) => {
            debug!("Generating lockfile...");
            (None, fetch::resolve(&module_descriptor, registry)?)
        }
    };

    let lockfile = fetch::lock_file(&resolved);
    debug!("Generated lockfile: {:?}", lockfile);

    match old_lock {
        Some(old_lock) if old_lock == lockfile => debug!("Lockfile is up to date"),
        Some(_) if lock_mode == LockMode::Locked => {
            return Err(format!("Lock file {} is out of date", lock_file_path.display()).into())
        }
        _ => {
            std::fs::write(&lock_file_path, lockfile.to_string()?)?;
            info!("Wrote lockfile to {}", lock_file_path.display());
        }
    }

    Ok(resolved)
}

/// Handler to show command
pub fn do_show(
    lock_mode: LockMode,
    registry: &InstallerRegistry,
    root: &Path,
    module_file_name: &Path,
    lock_file_name: &Path,
    default_vcs: VcsType,
) -> Result<Vec<String>, Box<dyn Error>> {
    let resolved = do_lock(
        lock_mode,
        registry,
        root,
        module_file_name,
        lock_file_name,
        default_vcs,
    )?;

    let mut lines = Vec::with_capacity(resolved.len());
    for dependency in &resolved {
        lines.push(format!("{} {}", dependency.name(), dependency.format_version()?));
    }
    Ok(lines)
}

pub fn do_clear_cache(cache_directory: &Path) -> Result<(), Box<dyn Error>> {
    if cache_directory.exists() {
        info!(
            "Clearing gofetch repository cache {}.",
            cache_directory.display()
        );
        std::fs::remove_dir_all(cache_directory)?;
    }
    Ok(())
}
