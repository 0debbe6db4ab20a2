use std::fmt::Display;

/// The package a dependency declaration belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct PackageRef {
    /// Import path of the package itself.
    pub path: String,
    /// Import path of the repository root that contains the package.
    pub root_path: String,
}

impl PackageRef {
    pub fn new(path: impl Into<String>, root_path: impl Into<String>) -> Self {
        PackageRef {
            path: path.into(),
            root_path: root_path.into(),
        }
    }

    /// A package that is itself the root of its repository.
    pub fn root(path: impl Into<String>) -> Self {
        let path = path.into();
        PackageRef {
            root_path: path.clone(),
            path,
        }
    }
}

impl Display for PackageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}
