use std::path::Path;

use git2::{build::CheckoutBuilder, Commit, Direction, Oid, Remote, Repository};
use log::{debug, warn};
use thiserror::Error;

use crate::{
    model::{notation::NotationDependency, subpackages::Subpackages},
    resolver::ResolvedCommit,
};

use super::cache::GitCache;

const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

const ORIGIN_HEAD: &str = "refs/remotes/origin/HEAD";

/// Tried in order when a declaration names neither a commit nor a tag.
const DEFAULT_BRANCHES: [&str; 4] = [
    ORIGIN_HEAD,
    "refs/remotes/origin/main",
    "refs/remotes/origin/master",
    "HEAD",
];

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Git error: {0}")]
    GitError(#[from] git2::Error),
    #[error("Commit {commit} was not found in {url}")]
    CommitNotFound { commit: String, url: String },
    #[error("Tag or branch {tag} was not found in {url}")]
    TagNotFound { tag: String, url: String },
    #[error("Could not determine the default branch of {url}")]
    NoDefaultBranch { url: String },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

pub struct GitRepository<'a> {
    cache: &'a GitCache,
    git_repo: Repository,
}

impl<'a> GitRepository<'a> {
    pub fn new(cache: &'a GitCache, git_repo: Repository) -> GitRepository<'a> {
        GitRepository { cache, git_repo }
    }

    fn url(&self) -> String {
        self.git_repo
            .find_remote("origin")
            .ok()
            .and_then(|remote| remote.url().map(str::to_owned))
            .unwrap_or_else(|| self.git_repo.path().display().to_string())
    }

    pub fn fetch(&self) -> Result<(), RepositoryError> {
        let mut remote = self.git_repo.find_remote("origin")?;
        remote.fetch(&FETCH_REFSPECS, Some(&mut self.cache.fetch_options()), None)?;
        if let Err(error) = self.record_default_branch(&mut remote) {
            warn!("Could not read the default branch of {}: {}", self.url(), error);
        }
        Ok(())
    }

    /// Points `origin/HEAD` at the branch the remote advertises as its HEAD.
    fn record_default_branch(&self, remote: &mut Remote<'_>) -> Result<(), git2::Error> {
        let connection =
            remote.connect_auth(Direction::Fetch, Some(self.cache.remote_callbacks()), None)?;
        let head = connection.default_branch()?;
        drop(connection);

        let Some(branch) = head.as_str().and_then(|head| head.strip_prefix("refs/heads/")) else {
            return Ok(());
        };
        self.git_repo.reference_symbolic(
            ORIGIN_HEAD,
            &format!("refs/remotes/origin/{branch}"),
            true,
            "record default branch",
        )?;
        Ok(())
    }

    /// Makes sure `commit_id` is present locally, fetching it if needed.
    pub fn fetch_commit(&self, commit_id: &str) -> Result<(), RepositoryError> {
        if self.find_commit(commit_id).is_ok() {
            return Ok(());
        }
        let mut remote = self.git_repo.find_remote("origin")?;

        if let Err(error) =
            remote.fetch(&[commit_id], Some(&mut self.cache.fetch_options()), None)
        {
            warn!(
                "Failed to fetch a single commit {}, falling back to a full fetch: {}",
                commit_id, error
            );
            self.fetch()?;
        }

        Ok(())
    }

    /// Commit pointed at by the declaration: its commit if any, otherwise its
    /// tag (or branch), otherwise the default branch.
    pub fn resolve_commit(
        &self,
        notation: &NotationDependency,
    ) -> Result<ResolvedCommit, RepositoryError> {
        let commit = match (&notation.commit, &notation.tag) {
            (Some(commit), _) => {
                self.find_commit(commit)
                    .map_err(|_| RepositoryError::CommitNotFound {
                        commit: commit.to_owned(),
                        url: self.url(),
                    })?
            }
            (None, Some(tag)) => [
                format!("refs/tags/{tag}"),
                format!("refs/remotes/origin/{tag}"),
                format!("refs/heads/{tag}"),
            ]
            .iter()
            .find_map(|spec| self.find_commit(spec).ok())
            .ok_or_else(|| RepositoryError::TagNotFound {
                tag: tag.to_owned(),
                url: self.url(),
            })?,
            (None, None) => DEFAULT_BRANCHES
                .iter()
                .find_map(|spec| self.find_commit(spec).ok())
                .ok_or_else(|| RepositoryError::NoDefaultBranch { url: self.url() })?,
        };

        debug!("{} {} resolved to {}", notation.name, notation.requested(), commit.id());

        let commit_time = commit.author().when().seconds() * 1000;
        Ok(ResolvedCommit {
            commit_id: commit.id().to_string(),
            commit_time,
        })
    }

    /// Writes the tree of `commit_id` into `target`, restricted to the given
    /// subpackages.
    pub fn checkout(
        &self,
        commit_id: &str,
        subpackages: &Subpackages,
        target: &Path,
    ) -> Result<(), RepositoryError> {
        let oid = Oid::from_str(commit_id)?;
        let commit = self.git_repo.find_commit(oid)?;

        std::fs::create_dir_all(target)?;

        let mut checkout = CheckoutBuilder::new();
        checkout
            .target_dir(target)
            .force()
            .recreate_missing(true)
            .update_index(false);
        if let Subpackages::Only(paths) = subpackages {
            for path in paths {
                checkout.path(path.as_str());
            }
        }

        self.git_repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))?;
        Ok(())
    }

    fn find_commit(&self, spec: &str) -> Result<Commit<'_>, git2::Error> {
        self.git_repo.revparse_single(spec)?.peel_to_commit()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use git2::{Signature, Time};

    use crate::model::{package::PackageRef, vcs::VcsType};

    use super::*;

    use pretty_assertions::assert_eq;

    fn commit_file(repo: &Repository, file: &str, content: &str, seconds: i64) -> Oid {
        let workdir = repo.workdir().unwrap();
        let path = workdir.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = Signature::new("Test", "test@example.com", &Time::new(seconds, 0)).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parents: Vec<&Commit<'_>> = parents.iter().collect();
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            "commit",
            &tree,
            &parents,
        )
        .unwrap()
    }

    fn notation(tag: Option<&str>, commit: Option<&str>) -> NotationDependency {
        NotationDependency {
            name: "example.com/foo/bar".to_string(),
            vcs: VcsType::Git,
            url: "https://example.com/foo/bar.git".to_string(),
            tag: tag.map(str::to_owned),
            commit: commit.map(str::to_owned),
            subpackages: Subpackages::All,
            first_level: true,
            package: PackageRef::root("example.com/foo/bar"),
        }
    }

    #[test]
    fn resolve_tag_branch_commit_and_head() {
        let cache_dir = tempfile::tempdir().unwrap();
        let repo_dir = tempfile::tempdir().unwrap();
        let cache = GitCache::new(cache_dir.path().to_path_buf(), git2::Config::new().unwrap())
            .unwrap();

        let repo = Repository::init(repo_dir.path()).unwrap();
        let first = commit_file(&repo, "sub/a/a.go", "package a", 1_600_000_000);
        repo.tag_lightweight(
            "v1.0.0",
            &repo.find_object(first, None).unwrap(),
            false,
        )
        .unwrap();
        repo.branch("feature", &repo.find_commit(first).unwrap(), false)
            .unwrap();
        let second = commit_file(&repo, "sub/b/b.go", "package b", 1_700_000_000);

        let repository = GitRepository::new(&cache, repo);

        let tagged = repository.resolve_commit(&notation(Some("v1.0.0"), None)).unwrap();
        assert_eq!(tagged.commit_id, first.to_string());
        assert_eq!(tagged.commit_time, 1_600_000_000_000);

        let branch = repository.resolve_commit(&notation(Some("feature"), None)).unwrap();
        assert_eq!(branch.commit_id, first.to_string());

        let second_id = second.to_string();
        let short = &second_id[..10];
        let pinned = repository.resolve_commit(&notation(Some("v1.0.0"), Some(short))).unwrap();
        assert_eq!(pinned.commit_id, second.to_string());
        assert_eq!(pinned.commit_time, 1_700_000_000_000);

        let head = repository.resolve_commit(&notation(None, None)).unwrap();
        assert_eq!(head.commit_id, second.to_string());

        assert!(matches!(
            repository.resolve_commit(&notation(Some("v9.9.9"), None)),
            Err(RepositoryError::TagNotFound { .. })
        ));
    }

    #[test]
    fn default_branch_follows_the_remote_head() {
        let cache_dir = tempfile::tempdir().unwrap();
        let upstream_dir = tempfile::tempdir().unwrap();
        let cache = GitCache::new(cache_dir.path().to_path_buf(), git2::Config::new().unwrap())
            .unwrap();

        let upstream = Repository::init(upstream_dir.path()).unwrap();
        upstream.set_head("refs/heads/develop").unwrap();
        let first = commit_file(&upstream, "a.go", "package a", 1_600_000_000);
        upstream
            .branch("main", &upstream.find_commit(first).unwrap(), false)
            .unwrap();
        let second = commit_file(&upstream, "b.go", "package a", 1_700_000_000);

        let repository = cache.repository(upstream_dir.path().to_str().unwrap()).unwrap();
        repository.fetch().unwrap();

        let head = repository.resolve_commit(&notation(None, None)).unwrap();
        assert_eq!(head.commit_id, second.to_string());
        assert_eq!(head.commit_time, 1_700_000_000_000);
    }
}
