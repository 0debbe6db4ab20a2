use std::{
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info};
use thiserror::Error;

use crate::{
    flock::FileLock,
    model::{
        notation::NotationDependency, resolved::VcsResolvedDependency,
        subpackages::Subpackages, vcs::VcsType,
    },
    repo_path::cache_path,
};

use super::{DependencyManager, ResolvedCommit};

const DEFAULT_REVISION: &str = "default";

#[derive(Error, Debug)]
pub enum MercurialError {
    #[error("{msg}: {context}")]
    Command { msg: String, context: String },
    #[error("Unexpected output from hg log: `{0}`")]
    UnexpectedOutput(String),
    #[error("Cache lock cannot be acquired")]
    Lock(#[from] crate::flock::Error),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// Resolves and installs mercurial dependencies with the `hg` command line.
pub struct MercurialDependencyManager {
    location: PathBuf,
    _lock: FileLock,
}

impl MercurialDependencyManager {
    pub fn new(location: PathBuf) -> Result<Self, MercurialError> {
        std::fs::create_dir_all(&location)?;
        let lock = FileLock::new(&location.join(".lock"))?;
        Ok(MercurialDependencyManager {
            location,
            _lock: lock,
        })
    }

    fn clone_or_pull(&self, url: &str) -> Result<PathBuf, MercurialError> {
        let path = self.location.join(cache_path(url));
        if path.join(".hg").exists() {
            debug!("Pulling {} into {}", url, path.display());
            hg(&["pull", url], &path, "failed to pull repository")?;
        } else {
            debug!("Cloning {} into {}", url, path.display());
            std::fs::create_dir_all(&path)?;
            hg(
                &["clone", "--noupdate", url, "."],
                &path,
                "failed to clone repository",
            )?;
        }
        Ok(path)
    }

    fn resolve_commit(
        &self,
        path: &Path,
        notation: &NotationDependency,
    ) -> Result<ResolvedCommit, MercurialError> {
        let revision = notation
            .commit
            .as_deref()
            .or(notation.tag.as_deref())
            .unwrap_or(DEFAULT_REVISION);
        let output = hg(
            &log_args(revision),
            path,
            &format!("failed to resolve revision {revision}"),
        )?;
        parse_log_line(&output)
    }
}

impl DependencyManager for MercurialDependencyManager {
    fn resolve(&self, notation: &NotationDependency) -> anyhow::Result<VcsResolvedDependency> {
        info!("Fetching {} from {}", notation.name, notation.url);
        let path = self.clone_or_pull(&notation.url)?;
        let commit = self.resolve_commit(&path, notation)?;

        Ok(VcsResolvedDependency::builder(VcsType::Mercurial)
            .url(&notation.url)
            .notation_dependency(notation)
            .commit_id(commit.commit_id)
            .commit_time(commit.commit_time)
            .build()?)
    }

    fn install(&self, dependency: &VcsResolvedDependency, target: &Path) -> anyhow::Result<()> {
        info!("Installing {} into {}", dependency, target.display());
        let path = self.clone_or_pull(dependency.url())?;

        let target = target.to_string_lossy().to_string();
        let mut args = vec![
            "archive".to_string(),
            "--type".to_string(),
            "files".to_string(),
            "-r".to_string(),
            dependency.commit_id().to_string(),
        ];
        if let Subpackages::Only(paths) = dependency.subpackages() {
            for subpackage in paths {
                args.push("-I".to_string());
                args.push(format!("path:{subpackage}"));
            }
        }
        args.push(target);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        hg(&args, &path, "failed to archive repository")?;
        Ok(())
    }
}

fn hg(args: &[&str], current_dir: &Path, msg: &str) -> Result<String, MercurialError> {
    let output = Command::new("hg")
        .args(args)
        .current_dir(current_dir)
        .output()?;
    if !output.status.success() {
        let context = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(MercurialError::Command {
            msg: msg.to_string(),
            context,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn log_args(revision: &str) -> [&str; 7] {
    [
        "log",
        "--limit",
        "1",
        "-r",
        revision,
        "--template",
        "{node} {date|hgdate}\n",
    ]
}

/// Parses the single `{node} {date|hgdate}` line printed by [`log_args`],
/// e.g. `<40 hex> 1600000000 -7200`.
fn parse_log_line(output: &str) -> Result<ResolvedCommit, MercurialError> {
    let unexpected = || MercurialError::UnexpectedOutput(output.to_string());
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());
    let line = lines.next().ok_or_else(unexpected)?;
    if lines.next().is_some() {
        return Err(unexpected());
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let [node, seconds, offset] = parts[..] else {
        return Err(unexpected());
    };
    let seconds = seconds.parse::<i64>().map_err(|_| unexpected())?;
    offset.parse::<i64>().map_err(|_| unexpected())?;
    Ok(ResolvedCommit {
        commit_id: node.to_string(),
        commit_time: seconds * 1000,
    })
}
