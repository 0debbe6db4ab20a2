use std::path::PathBuf;

use git2::{
    AutotagOption, Config, Cred, CredentialType, ErrorCode, FetchOptions, RemoteCallbacks,
    Repository,
};
use log::{debug, trace};
use thiserror::Error;

use crate::{flock::FileLock, git::repository::GitRepository, repo_path::cache_path};

const ORIGIN: &str = "origin";
const ORIGIN_BRANCHES: &str = "+refs/heads/*:refs/remotes/origin/*";

/// Bare mirrors of git dependencies under one locked directory.
///
/// Entries are keyed by [`cache_path`], so the https and ssh urls of one
/// repository share a mirror and the entry always fetches from the url it
/// was last asked for.
pub struct GitCache {
    location: PathBuf,
    git_config: Config,
    _lock: FileLock,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("Cache location {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("Cache lock cannot be acquired")]
    Lock(#[from] crate::flock::Error),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

impl GitCache {
    pub fn new(location: PathBuf, git_config: Config) -> Result<GitCache, CacheError> {
        std::fs::create_dir_all(&location)?;
        if !location.is_dir() {
            return Err(CacheError::NotADirectory(location));
        }

        let lock_path = location.join(".lock");
        debug!("Locking git cache {}", lock_path.display());
        let lock = FileLock::new(&lock_path)?;

        Ok(GitCache {
            location,
            git_config,
            _lock: lock,
        })
    }

    /// Opens the mirror of `url`, creating it on first use.
    pub fn repository(&self, url: &str) -> Result<GitRepository<'_>, CacheError> {
        let path = self.location.join(cache_path(url));
        let repo = match Repository::open_bare(&path) {
            Ok(repo) => repo,
            Err(error) if error.code() == ErrorCode::NotFound => {
                trace!("Creating mirror of {} at {}", url, path.display());
                Repository::init_bare(&path)?
            }
            Err(error) => return Err(error.into()),
        };
        point_origin_at(&repo, url)?;

        Ok(GitRepository::new(self, repo))
    }

    pub(super) fn remote_callbacks(&self) -> RemoteCallbacks<'_> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            credentials(&self.git_config, url, username, allowed)
        });
        callbacks
    }

    pub(super) fn fetch_options(&self) -> FetchOptions<'_> {
        let mut options = FetchOptions::new();
        options
            .remote_callbacks(self.remote_callbacks())
            .download_tags(AutotagOption::None);
        options
    }

    #[cfg(test)]
    fn entry_path(&self, url: &str) -> PathBuf {
        self.location.join(cache_path(url))
    }
}

fn point_origin_at(repo: &Repository, url: &str) -> Result<(), git2::Error> {
    match repo.find_remote(ORIGIN) {
        Ok(remote) if remote.url() == Some(url) => Ok(()),
        Ok(remote) => {
            debug!("Mirror origin moved from {:?} to {}", remote.url(), url);
            repo.remote_set_url(ORIGIN, url)
        }
        Err(error) if error.code() == ErrorCode::NotFound => {
            repo.remote_with_fetch(ORIGIN, url, ORIGIN_BRANCHES).map(drop)
        }
        Err(error) => Err(error),
    }
}

fn credentials(
    git_config: &Config,
    url: &str,
    username: Option<&str>,
    allowed: CredentialType,
) -> Result<Cred, git2::Error> {
    trace!("Credentials requested for {url} ({username:?}, {allowed:?})");
    let user = username.unwrap_or("git");
    if allowed.contains(CredentialType::USERNAME) {
        Cred::username(user)
    } else if allowed.contains(CredentialType::SSH_KEY) {
        Cred::ssh_key_from_agent(user)
    } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
        Cred::credential_helper(git_config, url, username)
    } else if allowed.contains(CredentialType::DEFAULT) {
        Cred::default()
    } else {
        Err(git2::Error::from_str("no supported authentication method"))
    }
}
