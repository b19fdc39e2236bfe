//! In-memory filesystem adapter.
//!
//! Drives the pipeline tests and lets embedders run dockgen without touching
//! disk. Paths are taken verbatim; nothing is normalised.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use dockgen_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, WalkOptions},
    },
    error::{DockgenError, DockgenResult},
};

/// In-memory filesystem for testing.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                inner.add_dirs(parent);
            }
            inner.files.insert(path.to_path_buf(), content.to_string());
        }
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(path: &Path) -> DockgenError {
    ApplicationError::filesystem(path, "memory filesystem lock poisoned").into()
}

impl Filesystem for MemoryFilesystem {
    fn list_files(&self, root: &Path, options: &WalkOptions) -> DockgenResult<Vec<PathBuf>> {
        let inner = self.inner.read().map_err(|_| lock_error(root))?;
        if !inner.directories.contains(root) {
            return Err(ApplicationError::filesystem(root, "No such directory").into());
        }

        Ok(inner
            .files
            .keys()
            .filter_map(|p| p.strip_prefix(root).ok())
            .filter(|rel| rel.components().count() <= options.max_depth)
            .filter(|rel| {
                rel.parent().is_none_or(|dir| {
                    !dir.components()
                        .any(|c| c.as_os_str().to_str().is_some_and(|s| options.is_ignored(s)))
                })
            })
            .map(Path::to_path_buf)
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> DockgenResult<String> {
        let inner = self.inner.read().map_err(|_| lock_error(path))?;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file").into())
    }

    fn create_dir_all(&self, path: &Path) -> DockgenResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error(path))?;
        inner.add_dirs(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> DockgenResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error(path))?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::filesystem(path, "Parent directory does not exist").into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> DockgenResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error(path))?;
        inner
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file").into())
    }

    fn rename(&self, from: &Path, to: &Path) -> DockgenResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error(to))?;
        let content = inner
            .files
            .remove(from)
            .ok_or_else(|| DockgenError::from(ApplicationError::filesystem(from, "No such file")))?;
        inner.files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> DockgenResult<PathBuf> {
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(ApplicationError::filesystem(path, "No such file or directory").into())
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }
}
