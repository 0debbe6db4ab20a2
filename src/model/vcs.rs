use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::ParseError;

/// Every version control system a dependency can be declared with.
///
/// Only [`VcsType::Git`] and [`VcsType::Mercurial`] can be resolved to a
/// pinned commit; the others are recognised so that declarations using them
/// fail with a precise error instead of a parse error.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum VcsType {
    Git,
    Mercurial,
    Svn,
    Bazaar,
}

impl VcsType {
    pub fn name(&self) -> &'static str {
        match self {
            VcsType::Git => "git",
            VcsType::Mercurial => "mercurial",
            VcsType::Svn => "svn",
            VcsType::Bazaar => "bazaar",
        }
    }

    /// Repository url used when a declaration does not name one.
    pub fn default_url(&self, name: &str) -> String {
        let name = name.trim_end_matches('/');
        match self {
            VcsType::Git => format!("https://{name}.git"),
            _ => format!("https://{name}"),
        }
    }
}

impl FromStr for VcsType {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.to_ascii_lowercase();
        match value.as_str() {
            "git" => Ok(VcsType::Git),
            "mercurial" => Ok(VcsType::Mercurial),
            "svn" => Ok(VcsType::Svn),
            "bazaar" => Ok(VcsType::Bazaar),
            _ => Err(ParseError::InvalidVcs(value)),
        }
    }
}

impl Display for VcsType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
