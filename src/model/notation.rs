use std::path::Path;

use log::{debug, error};
use toml::{Table, Value};

use crate::model::{
    lock::LockedNotation, package::PackageRef, subpackages::Subpackages, vcs::VcsType, ParseError,
};

/// A dependency as the user declared it, before anything was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationDependency {
    pub name: String,
    pub vcs: VcsType,
    pub url: String,
    /// Tag or branch to resolve.
    pub tag: Option<String>,
    /// Exact commit to resolve. Takes precedence over `tag`.
    pub commit: Option<String>,
    pub subpackages: Subpackages,
    pub first_level: bool,
    pub package: PackageRef,
}

impl NotationDependency {
    /// Re-reads a lock entry as a declaration pinned to the locked commit.
    pub fn from_locked(locked: &LockedNotation, first_level: bool) -> Self {
        NotationDependency {
            name: locked.name.clone(),
            vcs: locked.vcs,
            url: locked.url.clone(),
            tag: None,
            commit: Some(locked.commit.clone()),
            subpackages: locked
                .subpackages
                .as_ref()
                .map(|paths| Subpackages::from_paths(paths.iter().cloned()))
                .unwrap_or_default(),
            first_level,
            package: PackageRef::root(locked.name.clone()),
        }
    }

    /// Human readable form of what was requested, e.g. `v1.0.0` or `*`.
    pub fn requested(&self) -> &str {
        self.commit
            .as_deref()
            .or(self.tag.as_deref())
            .unwrap_or("*")
    }
}

/// The module file (`gofetch.toml`) of the consuming project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub dependencies: Vec<NotationDependency>,
}

impl Descriptor {
    pub fn from_file(path: &Path, default_vcs: VcsType) -> Result<Descriptor, ParseError> {
        debug!("Attempting to read descriptor from {}", path.display());
        let contents = std::fs::read_to_string(path)?;

        let descriptor = Descriptor::from_toml_str(&contents, default_vcs);
        if let Err(err) = &descriptor {
            error!("Could not build a valid descriptor from {} due to err {err}", path.display())
        }
        descriptor
    }

    pub fn from_toml_str(data: &str, default_vcs: VcsType) -> Result<Descriptor, ParseError> {
        let mut table = toml::from_str::<Table>(data)?;

        let name = table
            .remove("name")
            .ok_or_else(|| ParseError::MissingKey("name".to_string()))
            .and_then(|v| v.try_into::<String>().map_err(|e| e.into()))?;

        let dependencies = table
            .into_iter()
            .map(|(k, v)| parse_dependency(k, &v, default_vcs))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Descriptor { name, dependencies })
    }
}

fn parse_dependency(
    name: String,
    value: &Value,
    default_vcs: VcsType,
) -> Result<NotationDependency, ParseError> {
    if !value.is_table() {
        return Err(ParseError::NotATable(name));
    }

    let vcs = match value.get("vcs") {
        Some(vcs) => vcs.clone().try_into::<String>()?.parse::<VcsType>()?,
        None => default_vcs,
    };

    let url = optional_string(value, "url")?.unwrap_or_else(|| vcs.default_url(&name));
    let tag = optional_string(value, "tag")?;
    let commit = optional_string(value, "commit")?;

    let subpackages = value
        .get("subpackages")
        .map(|v| v.clone().try_into::<Vec<String>>())
        .map_or(Ok(None), |v| v.map(Some))?
        .map(Subpackages::from_paths)
        .unwrap_or_default();

    Ok(NotationDependency {
        package: PackageRef::root(name.clone()),
        name,
        vcs,
        url,
        tag,
        commit,
        subpackages,
        first_level: true,
    })
}

fn optional_string(value: &Value, key: &str) -> Result<Option<String>, ParseError> {
    value
        .get(key)
        .map(|v| v.clone().try_into::<String>())
        .transpose()
        .map_err(Into::into)
}
