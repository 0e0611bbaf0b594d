use std::path::{Path, PathBuf};

/// Resolve the program root directory.
///
/// Priority:
/// 1. `--root` flag / `ACADEMY_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.academy/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marker(&cwd, academy_core::paths::ACADEMY_DIR).unwrap_or(cwd)
}

/// First ancestor of `start` (inclusive) containing a `marker` directory.
fn find_marker(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_academy_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".academy")).unwrap();
        let subdir = dir.path().join("content/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_marker(&subdir, ".academy"), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn no_marker_yields_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_marker(dir.path(), ".academy-missing-marker"), None);
    }
}
