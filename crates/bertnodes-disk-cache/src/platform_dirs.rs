//! # Platform Directories
//!
//! Nothing here reads process environment overrides of its own;
//! callers pass an explicit dir instead.

use std::path::PathBuf;

use directories_next::ProjectDirs;

const QUALIFIER: &str = "io.crates";
const ORGANIZATION: &str = "";
const APPLICATION: &str = "bertnodes";

/// The platform's per-user cache dir for bertnodes, if it has one.
///
/// On Linux this is `$XDG_CACHE_HOME/bertnodes` or `~/.cache/bertnodes`.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.cache_dir().to_path_buf())
}

/// `explicit` when given, else [`default_cache_dir`].
pub fn resolve_cache_dir(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(default_cache_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = PathBuf::from("/tmp/bertnodes-models");
        assert_eq!(resolve_cache_dir(Some(dir.clone())), Some(dir));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(resolve_cache_dir(None), default_cache_dir());
        if let Some(dir) = default_cache_dir() {
            assert!(dir.to_string_lossy().contains(APPLICATION));
        }
    }
}
