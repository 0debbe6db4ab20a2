use std::collections::BTreeSet;

/// Marker used in declarations and lock files for "every subpackage".
pub const ALL_SUBPACKAGES: &str = "...";

/// Which directories of a repository are used by the consuming module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Subpackages {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Subpackages {
    /// Builds the set from declared paths. An empty list or a list containing
    /// [`ALL_SUBPACKAGES`] means every subpackage.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for path in paths {
            let path = path.into();
            if path == ALL_SUBPACKAGES {
                return Subpackages::All;
            }
            set.insert(path);
        }
        if set.is_empty() {
            Subpackages::All
        } else {
            Subpackages::Only(set)
        }
    }

    pub fn contains_all(&self) -> bool {
        matches!(self, Subpackages::All)
    }

    /// Paths in their canonical (sorted) order, `None` for all subpackages.
    pub fn to_vec(&self) -> Option<Vec<String>> {
        match self {
            Subpackages::All => None,
            Subpackages::Only(set) => Some(set.iter().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn sentinel_means_all() {
        assert_eq!(Subpackages::from_paths(["sub/a", "..."]), Subpackages::All);
        assert_eq!(Subpackages::from_paths(Vec::<String>::new()), Subpackages::All);
    }

    #[test]
    fn explicit_paths_are_sorted() {
        let subpackages = Subpackages::from_paths(["sub/b", "sub/a", "sub/b"]);
        assert!(!subpackages.contains_all());
        assert_eq!(
            subpackages.to_vec(),
            Some(vec!["sub/a".to_owned(), "sub/b".to_owned()])
        );
    }
}
