use anyhow::bail;
use log::debug;

use crate::model::{
    lock::LockFile, notation::NotationDependency, resolved::VcsResolvedDependency,
};

use super::DependencyResolver;

/// Commit time of records rebuilt from a lock file, which does not store it.
pub const UNKNOWN_COMMIT_TIME: i64 = 0;

/// Reuses the commits pinned by an existing lock file. The inner resolver is
/// asked about declarations the lock file does not know, and about tags,
/// which the lock file does not record and which may have moved.
pub struct LockFileResolver<'a, R> {
    inner: R,
    lock_file: &'a LockFile,
    locked: bool,
}

impl<'a, R> LockFileResolver<'a, R> {
    pub fn new(inner: R, lock_file: &'a LockFile, locked: bool) -> Self {
        Self {
            inner,
            lock_file,
            locked,
        }
    }
}

impl<R> DependencyResolver for LockFileResolver<'_, R>
where
    R: DependencyResolver,
{
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency> {
        match self.lock_file.find(notation) {
            Some(locked) if !pins_locked_commit(notation, &locked.commit) => {
                if self.locked {
                    bail!(
                        "Dependency {} is pinned to {}, but the lock file specifies {}",
                        notation.name,
                        notation.requested(),
                        locked.commit
                    );
                }
                debug!(
                    "Dependency {} was re-pinned from {} to {}",
                    notation.name,
                    locked.commit,
                    notation.requested()
                );
                self.inner.resolve(notation)
            }
            Some(locked) if notation.commit.is_none() && notation.tag.is_some() => {
                let current = self.inner.resolve(notation)?;
                if current.commit_id() == locked.commit {
                    return Ok(current);
                }
                if self.locked {
                    bail!(
                        "Dependency {} {} resolves to {}, but the lock file specifies {}",
                        notation.name,
                        notation.requested(),
                        current.commit_id(),
                        locked.commit
                    );
                }
                debug!(
                    "Dependency {} {} moved from {} to {}",
                    notation.name,
                    notation.requested(),
                    locked.commit,
                    current.commit_id()
                );
                Ok(current)
            }
            Some(locked) => {
                debug!(
                    "Dependency {} {} found in the lock file with commit {}",
                    notation.name,
                    notation.requested(),
                    locked.commit
                );
                Ok(VcsResolvedDependency::builder(locked.vcs)
                    .url(&locked.url)
                    .notation_dependency(notation)
                    .commit_id(&locked.commit)
                    .commit_time(UNKNOWN_COMMIT_TIME)
                    .build()?)
            }
            None if self.locked => {
                bail!(
                    "No entry for {} {} in the lock file",
                    notation.name,
                    notation.requested()
                );
            }
            None => {
                debug!(
                    "Dependency {} {} not found in the lock file",
                    notation.name,
                    notation.requested()
                );
                self.inner.resolve(notation)
            }
        }
    }
}

fn pins_locked_commit(notation: &NotationDependency, locked_commit: &str) -> bool {
    notation
        .commit
        .as_deref()
        .map_or(true, |commit| locked_commit.starts_with(commit))
}
