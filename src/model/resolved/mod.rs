mod builder;

use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use thiserror::Error;

use crate::{
    model::{
        lock::LockedNotation, package::PackageRef, subpackages::Subpackages, vcs::VcsType,
    },
    resolver::{DependencyManager, InstallerRegistry, RegistryError},
};

pub use builder::{BuildError, ResolvedDependencyBuilder};

/// Number of commit id characters shown by [`VcsResolvedDependency::format_version`].
pub const COMMIT_PREFIX_LENGTH: usize = 7;

/// The version control systems a dependency can actually be pinned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum ResolvedVcs {
    Git,
    Mercurial,
}

impl From<ResolvedVcs> for VcsType {
    fn from(vcs: ResolvedVcs) -> Self {
        match vcs {
            ResolvedVcs::Git => VcsType::Git,
            ResolvedVcs::Mercurial => VcsType::Mercurial,
        }
    }
}

impl TryFrom<VcsType> for ResolvedVcs {
    type Error = BuildError;

    fn try_from(vcs: VcsType) -> Result<Self, Self::Error> {
        match vcs {
            VcsType::Git => Ok(ResolvedVcs::Git),
            VcsType::Mercurial => Ok(ResolvedVcs::Mercurial),
            other => Err(BuildError::UnsupportedVcs(other)),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Commit id `{commit_id}` of {name} is shorter than {COMMIT_PREFIX_LENGTH} characters")]
    ShortCommitId { name: String, commit_id: String },
}

/// A dependency pinned to an exact commit of a Git or Mercurial repository.
///
/// Records are only created through [`VcsResolvedDependency::builder`] and
/// cannot be modified afterwards. Two records are equal when their vcs,
/// url, name and commit id match; the tag, commit time and subpackages are
/// ignored.
#[derive(Debug, Clone)]
pub struct VcsResolvedDependency {
    vcs: ResolvedVcs,
    name: String,
    url: String,
    commit_id: String,
    commit_time: i64,
    tag: Option<String>,
    subpackages: Subpackages,
    first_level: bool,
    package: PackageRef,
}

impl VcsResolvedDependency {
    pub fn builder(vcs_type: VcsType) -> ResolvedDependencyBuilder {
        ResolvedDependencyBuilder::new(vcs_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn vcs_type(&self) -> VcsType {
        self.vcs.into()
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// Same as [`Self::commit_id`]: the version of a vcs dependency is its commit.
    pub fn version(&self) -> &str {
        &self.commit_id
    }

    /// Commit time in milliseconds since the epoch.
    pub fn commit_time(&self) -> i64 {
        self.commit_time
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn subpackages(&self) -> &Subpackages {
        &self.subpackages
    }

    pub fn is_first_level(&self) -> bool {
        self.first_level
    }

    pub fn package(&self) -> &PackageRef {
        &self.package
    }

    /// The dependency manager registered for this record's vcs.
    pub fn installer<'a>(
        &self,
        registry: &'a InstallerRegistry,
    ) -> Result<&'a dyn DependencyManager, RegistryError> {
        registry.get(self.vcs_type())
    }

    pub fn to_locked_notation(&self) -> LockedNotation {
        LockedNotation {
            name: self.name.clone(),
            vcs: self.vcs_type(),
            url: self.url.clone(),
            commit: self.commit_id.clone(),
            subpackages: self.subpackages.to_vec(),
        }
    }

    /// `v1.2.0(a1b2c3d)` when a tag is known, `a1b2c3d` otherwise.
    pub fn format_version(&self) -> Result<String, FormatError> {
        let prefix = match self.commit_id.char_indices().nth(COMMIT_PREFIX_LENGTH) {
            Some((end, _)) => &self.commit_id[..end],
            None if self.commit_id.chars().count() == COMMIT_PREFIX_LENGTH => &self.commit_id,
            None => {
                return Err(FormatError::ShortCommitId {
                    name: self.name.clone(),
                    commit_id: self.commit_id.clone(),
                })
            }
        };
        Ok(match &self.tag {
            Some(tag) => format!("{tag}({prefix})"),
            None => prefix.to_string(),
        })
    }
}

impl Display for VcsResolvedDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.commit_id)
    }
}

impl PartialEq for VcsResolvedDependency {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.commit_id == other.commit_id
            && self.vcs == other.vcs
            && self.url == other.url
    }
}

impl Eq for VcsResolvedDependency {}

impl Hash for VcsResolvedDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.commit_id.hash(state);
        self.name.hash(state);
        self.vcs.hash(state);
    }
}
