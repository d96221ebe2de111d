use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Recursively collect every file named exactly `filename` under `root`.
///
/// Hidden entries (leading `.`) and directories named in `skip_dirs` (vendor
/// caches like `node_modules`) are not descended into. Traversal order is
/// not defined. Directories are tracked by canonical path so symlink cycles
/// terminate instead of looping.
pub fn find_files(root: &Path, filename: &str, skip_dirs: &[String]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        match fs::canonicalize(&dir) {
            Ok(canonical) => {
                if !visited.insert(canonical) {
                    continue;
                }
            }
            Err(err) => {
                warn!(dir = %dir.display(), %err, "skipping unreadable directory");
                continue;
            }
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if path.is_dir() {
                if name.starts_with('.') || skip_dirs.iter().any(|skip| *skip == name) {
                    continue;
                }
                pending.push(path);
            } else if name == filename {
                found.push(path);
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn skip_dirs() -> Vec<String> {
        vec!["node_modules".to_string(), "vendor".to_string()]
    }

    #[test]
    fn test_finds_nested_matches() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("services/api")).unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::write(dir.path().join("services/api/package.json"), "{}").unwrap();
        fs::write(dir.path().join("services/api/README.md"), "").unwrap();

        let mut files = find_files(dir.path(), "package.json", &skip_dirs());
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.ends_with("package.json")));
    }

    #[test]
    fn test_skips_hidden_and_vendor_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git/sub")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/express")).unwrap();
        fs::write(dir.path().join(".git/sub/package.json"), "{}").unwrap();
        fs::write(dir.path().join("node_modules/express/package.json"), "{}").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();

        let files = find_files(dir.path(), "package.json", &skip_dirs());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0], dir.path().join("package.json"));
    }

    #[test]
    fn test_exact_filename_match_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json.bak"), "{}").unwrap();
        fs::write(dir.path().join("old-package.json"), "{}").unwrap();

        let files = find_files(dir.path(), "package.json", &skip_dirs());
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/requirements.txt"), "flask").unwrap();
        // b/loop points back at a
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("a/b/loop")).unwrap();

        let files = find_files(dir.path(), "requirements.txt", &skip_dirs());
        assert_eq!(files.len(), 1);
    }
}
