use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{notation::NotationDependency, vcs::VcsType, ParseError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockFile {
    #[serde(default)]
    pub dependencies: Vec<LockedNotation>,
}

const VERSION: i64 = 1;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct VersionedLockFile<'a> {
    pub version: i64,
    #[serde(flatten)]
    pub content: &'a LockFile,
}

impl LockFile {
    /// Entries are kept sorted so that identical resolutions always produce
    /// identical files.
    pub fn new(dependencies: impl IntoIterator<Item = LockedNotation>) -> LockFile {
        let mut dependencies: Vec<LockedNotation> = dependencies.into_iter().collect();
        dependencies.sort();
        dependencies.dedup();
        LockFile { dependencies }
    }

    pub fn from_file(file: &Path) -> Result<LockFile, ParseError> {
        LockFile::from_str(&std::fs::read_to_string(file)?)
    }

    pub fn from_str(s: &str) -> Result<LockFile, ParseError> {
        let mut table = toml::from_str::<toml::Table>(s)?;
        match table.remove("version") {
            Some(toml::Value::Integer(VERSION)) => table.try_into::<LockFile>().map_err(Into::into),
            Some(other) => Err(ParseError::UnsupportedLockFileVersion(other)),
            None => Err(ParseError::MissingKey("version".to_string())),
        }
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&VersionedLockFile {
            version: VERSION,
            content: self,
        })
    }

    /// The entry that locks the given declaration, if any.
    pub fn find(&self, notation: &NotationDependency) -> Option<&LockedNotation> {
        self.dependencies.iter().find(|locked| {
            locked.name == notation.name && locked.vcs == notation.vcs && locked.url == notation.url
        })
    }
}

/// The lock representation of one resolved dependency. Key names are part
/// of the lock file format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct LockedNotation {
    pub name: String,
    pub vcs: VcsType,
    pub url: String,
    pub commit: String,
    /// Absent when every subpackage is used.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subpackages: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use toml::toml;

    use super::*;

    use pretty_assertions::assert_eq;

    fn locked(name: &str, vcs: VcsType, commit: &str) -> LockedNotation {
        LockedNotation {
            name: name.to_string(),
            vcs,
            url: vcs.default_url(name),
            commit: commit.to_string(),
            subpackages: None,
        }
    }

    #[test]
    fn load_save_lock_file() {
        let text = toml::to_string_pretty(&toml! {
            version = 1

            [[dependencies]]
            name = "bitbucket.org/foo/baz"
            vcs = "mercurial"
            url = "https://bitbucket.org/foo/baz"
            commit = "hash2"

            [[dependencies]]
            name = "github.com/foo/bar"
            vcs = "git"
            url = "https://github.com/foo/bar.git"
            commit = "hash1"
        })
        .unwrap();
        let data = LockFile::new([
            locked("github.com/foo/bar", VcsType::Git, "hash1"),
            locked("bitbucket.org/foo/baz", VcsType::Mercurial, "hash2"),
        ]);
        let parsed = LockFile::from_str(&text).unwrap();
        let formatted = data.to_string().unwrap();
        assert_eq!(parsed, data);
        assert_eq!(formatted, text);
    }

    #[test]
    fn subpackages_survive_a_save_load_cycle() {
        let mut entry = locked("github.com/foo/bar", VcsType::Git, "hash1");
        entry.subpackages = Some(vec!["sub/a".to_string(), "sub/b".to_string()]);
        let data = LockFile::new([entry]);

        let formatted = data.to_string().unwrap();
        assert!(formatted.contains("subpackages"));
        assert_eq!(LockFile::from_str(&formatted).unwrap(), data);
    }

    #[test]
    fn output_is_deterministic() {
        let a = locked("github.com/a/a", VcsType::Git, "hash1");
        let b = locked("github.com/b/b", VcsType::Git, "hash2");
        let first = LockFile::new([a.clone(), b.clone()]).to_string().unwrap();
        let second = LockFile::new([b, a.clone(), a]).to_string().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn load_lock_file_without_version() {
        let text = toml::to_string_pretty(&toml! {
            dependencies = []
        })
        .unwrap();
        LockFile::from_str(&text).expect_err("should not parse unversioned lock file");
    }

    #[test]
    fn load_lock_file_future_version() {
        let text = toml::to_string_pretty(&toml! {
            version = 2
        })
        .unwrap();
        assert!(matches!(
            LockFile::from_str(&text),
            Err(ParseError::UnsupportedLockFileVersion(_))
        ));
    }

    #[test]
    fn find_matches_name_vcs_and_url() {
        let lock = LockFile::new([locked("github.com/foo/bar", VcsType::Git, "hash1")]);
        let descriptor = crate::model::notation::Descriptor::from_toml_str(
            r#"
                name = "app"
                ["github.com/foo/bar"]
                ["github.com/foo/other"]
            "#,
            VcsType::Git,
        )
        .unwrap();
        assert!(lock.find(&descriptor.dependencies[0]).is_some());
        assert!(lock.find(&descriptor.dependencies[1]).is_none());
    }
}
