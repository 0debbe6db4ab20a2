use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    model::{lock::LockFile, notation::Descriptor, resolved::VcsResolvedDependency},
    resolver::{DependencyResolver, InstallerRegistry, RegistryError},
};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error while resolving {name}: {error:#}")]
    Resolve { name: String, error: anyhow::Error },
    #[error("Error while installing {dependency}: {error:#}")]
    Install {
        dependency: String,
        error: anyhow::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// Pins every dependency declared by the descriptor. Equal records are kept
/// once; when one name resolves to different records the first one wins.
pub fn resolve<R: DependencyResolver>(
    descriptor: &Descriptor,
    resolver: &R,
) -> Result<Vec<VcsResolvedDependency>, FetchError> {
    let mut seen: HashSet<VcsResolvedDependency> = HashSet::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut resolved: Vec<VcsResolvedDependency> = Vec::new();

    for notation in &descriptor.dependencies {
        info!("Resolving {} {}", notation.name, notation.requested());
        let dependency = resolver
            .resolve(notation)
            .map_err(|error| FetchError::Resolve {
                name: notation.name.clone(),
                error,
            })?;

        if seen.contains(&dependency) {
            debug!("Skipping duplicate {}", dependency);
            continue;
        }
        if let Some(&index) = by_name.get(dependency.name()) {
            warn!(
                "Conflicting resolutions for {}: keeping {}, discarding {}",
                dependency.name(),
                resolved[index],
                dependency
            );
            continue;
        }

        by_name.insert(dependency.name().to_owned(), resolved.len());
        seen.insert(dependency.clone());
        resolved.push(dependency);
    }

    Ok(resolved)
}

pub fn lock_file(resolved: &[VcsResolvedDependency]) -> LockFile {
    LockFile::new(resolved.iter().map(VcsResolvedDependency::to_locked_notation))
}

/// Installs each dependency into `<output_directory>/<name>` with the
/// dependency manager of its vcs.
pub fn install(
    registry: &InstallerRegistry,
    resolved: &[VcsResolvedDependency],
    output_directory: &Path,
) -> Result<(), FetchError> {
    for dependency in resolved {
        let target = output_directory.join(dependency.name());
        if target.exists() {
            debug!("Removing previous sources of {} at {}", dependency.name(), target.display());
            std::fs::remove_dir_all(&target)?;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        dependency
            .installer(registry)?
            .install(dependency, &target)
            .map_err(|error| FetchError::Install {
                dependency: dependency.to_string(),
                error,
            })?;
    }
    Ok(())
}
