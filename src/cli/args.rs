use clap::{Args, Parser, Subcommand};

use crate::LockMode;

/// Pins Go dependencies hosted in git or mercurial repositories to exact commits.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Location of the module file declaring the dependencies
    #[clap(short, long, default_value = "gofetch.toml")]
    pub module_location: String,
    /// Location of the lock file
    #[clap(short, long, default_value = "gofetch.lock")]
    pub lockfile_location: String,
    /// Directory the dependency sources are installed into
    #[clap(short, long, default_value = "vendor")]
    pub output_directory: String,
    /// Location of the repository cache [default: $HOME/.gofetch/cache]
    #[clap(short, long)]
    pub cache_directory: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolves the dependencies and installs their sources
    Fetch(LockArgs),
    /// Creates or updates the lock file
    Lock(LockArgs),
    /// Prints the resolved version of every dependency
    Show(LockArgs),
    /// Deletes the repository cache
    ClearCache,
}

#[derive(Debug, Args)]
pub struct LockArgs {
    /// Fail if the lock file is missing or out of date
    #[clap(long, conflicts_with = "recreate")]
    pub locked: bool,
    /// Ignore the existing lock file and resolve everything again
    #[clap(long)]
    pub recreate: bool,
}

impl LockArgs {
    pub fn lock_mode(&self) -> LockMode {
        match (self.locked, self.recreate) {
            (true, _) => LockMode::Locked,
            (false, true) => LockMode::Recreate,
            (false, false) => LockMode::Update,
        }
    }
}
