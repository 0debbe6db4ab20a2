use std::path::{Component, PathBuf};

use regex_lite::Regex;

/// Maps a repository url to a relative directory inside a cache, e.g.
/// `https://github.com/foo/bar.git` and `git@github.com:foo/bar.git` both
/// become `github.com/foo/bar`.
pub fn cache_path(url: &str) -> PathBuf {
    let re = Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://)?(?:[^@/]+@)?").unwrap();
    let stripped = re.replace(url, "").replace(':', "/");
    let stripped = stripped.trim_end_matches('/');
    let stripped = stripped.strip_suffix(".git").unwrap_or(stripped);

    PathBuf::from(stripped)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_owned()),
            _ => None,
        })
        .collect()
}
