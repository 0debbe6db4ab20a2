use thiserror::Error;

pub mod lock;
pub mod notation;
pub mod package;
pub mod resolved;
pub mod subpackages;
pub mod vcs;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading configuration toml: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Missing TOML key `{0}` while parsing")]
    MissingKey(String),
    #[error("Invalid vcs `{0}`, expected one of git, mercurial, svn, bazaar")]
    InvalidVcs(String),
    #[error("Dependency `{0}` must be a table")]
    NotATable(String),
    #[error("Unsupported lock file version {0}")]
    UnsupportedLockFileVersion(toml::Value),
}
