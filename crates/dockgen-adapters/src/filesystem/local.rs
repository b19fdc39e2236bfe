//! Local filesystem adapter using std::fs and walkdir.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use dockgen_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, WalkOptions},
    },
    error::{DockgenError, DockgenResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn list_files(&self, root: &Path, options: &WalkOptions) -> DockgenResult<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .max_depth(options.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !options.is_ignored(name))
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(map_io_error(root, e.into(), "walk directory"));
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(rel.to_path_buf());
            }
        }

        files.sort();
        debug!(root = %root.display(), files = files.len(), "Listed files");
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> DockgenResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn create_dir_all(&self, path: &Path) -> DockgenResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    /// Writes a hidden sibling first, then renames it over the target.
    fn write_file(&self, path: &Path, content: &str) -> DockgenResult<()> {
        let tmp = temp_sibling(path);
        if let Err(e) = std::fs::write(&tmp, content) {
            let _ = std::fs::remove_file(&tmp);
            return Err(map_io_error(path, e, "write file"));
        }
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            map_io_error(path, e, "replace file")
        })
    }

    fn remove_file(&self, path: &Path) -> DockgenResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn rename(&self, from: &Path, to: &Path) -> DockgenResult<()> {
        std::fs::rename(from, to).map_err(|e| map_io_error(to, e, "rename file"))
    }

    fn canonicalize(&self, path: &Path) -> DockgenResult<PathBuf> {
        std::fs::canonicalize(path).map_err(|e| map_io_error(path, e, "resolve path"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> DockgenError {
    ApplicationError::filesystem(path, format!("Failed to {}: {}", operation, e)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn lists_relative_sorted_and_skips_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "package.json");
        touch(dir.path(), "src/index.js");
        touch(dir.path(), "node_modules/express/package.json");
        touch(dir.path(), ".git/HEAD");

        let files = LocalFilesystem::new()
            .list_files(dir.path(), &WalkOptions::default())
            .unwrap();

        assert_eq!(
            files,
            vec![PathBuf::from("package.json"), PathBuf::from("src/index.js")]
        );
    }

    #[test]
    fn respects_max_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "one/two/deep.py");

        let options = WalkOptions {
            max_depth: 2,
            ..WalkOptions::default()
        };
        let files = LocalFilesystem::new().list_files(dir.path(), &options).unwrap();

        assert_eq!(files, vec![PathBuf::from("a.py")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result =
            LocalFilesystem::new().list_files(&dir.path().join("nope"), &WalkOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn write_replaces_atomically_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("Dockerfile");
        let fs_adapter = LocalFilesystem::new();

        fs_adapter.write_file(&target, "FROM a:1\n").unwrap();
        fs_adapter.write_file(&target, "FROM b:2\n").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "FROM b:2\n");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .write_file(&dir.path().join("missing/Dockerfile"), "x")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to write file"));
    }

    #[test]
    fn canonicalize_resolves_dot() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("shop");
        fs::create_dir(&nested).unwrap();

        let resolved = LocalFilesystem::new()
            .canonicalize(&nested.join("."))
            .unwrap();

        assert_eq!(resolved.file_name().unwrap(), "shop");
        assert!(LocalFilesystem::new().canonicalize(&dir.path().join("nope")).is_err());
    }
}
