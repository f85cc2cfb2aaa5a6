//! SQL file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SqlDocResult;

/// Directory names never descended into.
const SKIP_DIRS: [&str; 3] = [".git", "target", "node_modules"];

/// All `.sql` files under `base`, recursively, in path order.
///
/// The base directory must be readable; an unreadable subdirectory is
/// logged and skipped. Symlinked directories are not followed.
pub fn sql_files(base: &Path) -> SqlDocResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(base)?;
    walk(entries, &mut files);
    files.sort();
    Ok(files)
}

fn walk(entries: fs::ReadDir, files: &mut Vec<PathBuf>) {
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        // Symlinked directories are not descended into; symlinked files are
        // listed like regular ones.
        if file_type.is_symlink() {
            if path.is_file() && is_sql(&path) {
                files.push(path);
            }
        } else if file_type.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if SKIP_DIRS.contains(&name) {
                continue;
            }
            match fs::read_dir(&path) {
                Ok(children) => walk(children, files),
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "cannot read directory");
                }
            }
        } else if is_sql(&path) {
            files.push(path);
        }
    }
}

fn is_sql(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sql"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_walk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("tables/nested")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();

        fs::write(root.join("tables/orders.sql"), "").unwrap();
        fs::write(root.join("tables/nested/Items.SQL"), "").unwrap();
        fs::write(root.join("readme.md"), "").unwrap();
        fs::write(root.join(".git/hook.sql"), "").unwrap();
        fs::write(root.join("target/out.sql"), "").unwrap();
        fs::write(root.join("a.sql"), "").unwrap();

        let found: Vec<PathBuf> = sql_files(root)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            [
                PathBuf::from("a.sql"),
                PathBuf::from("tables/nested/Items.SQL"),
                PathBuf::from("tables/orders.sql"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.sql"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("a.sql"), root.join("b.sql")).unwrap();

        let found = sql_files(root).unwrap();
        assert_eq!(found, [root.join("a.sql"), root.join("b.sql")]);
    }

    #[test]
    fn test_missing_base() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sql_files(&dir.path().join("absent")).is_err());
    }
}
