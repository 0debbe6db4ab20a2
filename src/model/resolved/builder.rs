use log::trace;
use thiserror::Error;

use crate::model::{notation::NotationDependency, vcs::VcsType};

use super::{ResolvedVcs, VcsResolvedDependency};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("Dependencies from {0} repositories cannot be pinned to a commit")]
    UnsupportedVcs(VcsType),
    #[error("Missing {0} while building a resolved dependency")]
    Missing(&'static str),
}

/// Collects the fetch results and the declaration of a dependency, then
/// assembles the immutable [`VcsResolvedDependency`] in [`Self::build`].
#[derive(Debug, Clone)]
pub struct ResolvedDependencyBuilder {
    vcs_type: VcsType,
    notation_dependency: Option<NotationDependency>,
    url: Option<String>,
    commit_id: Option<String>,
    commit_time: i64,
}

impl ResolvedDependencyBuilder {
    pub(super) fn new(vcs_type: VcsType) -> Self {
        ResolvedDependencyBuilder {
            vcs_type,
            notation_dependency: None,
            url: None,
            commit_id: None,
            commit_time: 0,
        }
    }

    /// Url the repository was actually fetched from.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Declaration the name, tag, subpackages, first level flag and owning
    /// package are taken from.
    pub fn notation_dependency(mut self, notation: &NotationDependency) -> Self {
        self.notation_dependency = Some(notation.clone());
        self
    }

    pub fn commit_id(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }

    /// Commit time in milliseconds since the epoch.
    pub fn commit_time(mut self, commit_time: i64) -> Self {
        self.commit_time = commit_time;
        self
    }

    pub fn build(self) -> Result<VcsResolvedDependency, BuildError> {
        let vcs = ResolvedVcs::try_from(self.vcs_type)?;
        let notation = self
            .notation_dependency
            .ok_or(BuildError::Missing("notation dependency"))?;
        let url = self.url.ok_or(BuildError::Missing("url"))?;
        let commit_id = self.commit_id.ok_or(BuildError::Missing("commit id"))?;

        trace!("Building {:?} dependency {}#{}", vcs, notation.name, commit_id);

        let NotationDependency {
            name,
            tag,
            subpackages,
            first_level,
            package,
            ..
        } = notation;

        Ok(VcsResolvedDependency {
            vcs,
            name,
            url,
            commit_id,
            commit_time: self.commit_time,
            tag,
            subpackages,
            first_level,
            package,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{package::PackageRef, subpackages::Subpackages};

    use super::*;

    use pretty_assertions::assert_eq;

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    fn notation() -> NotationDependency {
        NotationDependency {
            name: "github.com/foo/bar".to_string(),
            vcs: VcsType::Git,
            url: "https://github.com/foo/bar.git".to_string(),
            tag: Some("v1.0.0".to_string()),
            commit: None,
            subpackages: Subpackages::from_paths(["sub/a", "sub/b"]),
            first_level: false,
            package: PackageRef::new("github.com/foo/bar/sub", "github.com/foo/bar"),
        }
    }

    #[test]
    fn build_copies_fetch_results_and_declaration() {
        let notation = notation();
        let dependency = VcsResolvedDependency::builder(VcsType::Mercurial)
            .commit_time(1_600_000_000_000)
            .notation_dependency(&notation)
            .commit_id(COMMIT)
            .url("https://mirror.example.com/bar")
            .build()
            .unwrap();

        assert_eq!(dependency.vcs_type(), VcsType::Mercurial);
        assert_eq!(dependency.name(), "github.com/foo/bar");
        assert_eq!(dependency.url(), "https://mirror.example.com/bar");
        assert_eq!(dependency.commit_id(), COMMIT);
        assert_eq!(dependency.version(), COMMIT);
        assert_eq!(dependency.commit_time(), 1_600_000_000_000);

        assert_eq!(dependency.tag(), Some("v1.0.0"));
        assert_eq!(dependency.subpackages(), &notation.subpackages);
        assert!(!dependency.is_first_level());
        assert_eq!(dependency.package(), &notation.package);
    }

    #[test]
    fn build_rejects_unsupported_vcs() {
        for vcs in [VcsType::Svn, VcsType::Bazaar] {
            let result = VcsResolvedDependency::builder(vcs)
                .url("https://example.com/repo")
                .notation_dependency(&notation())
                .commit_id(COMMIT)
                .build();
            assert_eq!(result.unwrap_err(), BuildError::UnsupportedVcs(vcs));
        }
    }

    #[test]
    fn unsupported_vcs_is_reported_before_missing_inputs() {
        let result = VcsResolvedDependency::builder(VcsType::Svn).build();
        assert_eq!(result.unwrap_err(), BuildError::UnsupportedVcs(VcsType::Svn));
    }

    #[test]
    fn build_requires_inputs() {
        let missing_notation = VcsResolvedDependency::builder(VcsType::Git)
            .url("https://example.com/repo")
            .commit_id(COMMIT)
            .build();
        assert_eq!(
            missing_notation.unwrap_err(),
            BuildError::Missing("notation dependency")
        );

        let missing_url = VcsResolvedDependency::builder(VcsType::Git)
            .notation_dependency(&notation())
            .commit_id(COMMIT)
            .build();
        assert_eq!(missing_url.unwrap_err(), BuildError::Missing("url"));

        let missing_commit = VcsResolvedDependency::builder(VcsType::Git)
            .notation_dependency(&notation())
            .url("https://example.com/repo")
            .build();
        assert_eq!(missing_commit.unwrap_err(), BuildError::Missing("commit id"));
    }
}
