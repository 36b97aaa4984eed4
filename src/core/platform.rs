//! Purpose: Capability boundary between the resolution chain and the host.
//! Exports: `FileSystem`, `BinaryLoader`, `HostPlatform`, `MemoryPlatform`, `NativeAddon`.
//! Role: Injection seam; resolvers see capabilities, never `std::fs` directly.
//! Invariants: Capabilities are read-only apart from the load call itself.
//! Invariants: `list_entries` fails when the path is not a readable directory.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use libloading::Library;

use crate::core::error::{Error, ErrorKind};

/// Filesystem capability consumed by the resolution chain.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    /// Names of the direct children of `path`, sorted.
    fn list_entries(&self, path: &Path) -> Result<Vec<String>, Error>;
}

/// Binary-load capability. The handle stays opaque to the resolution chain.
pub trait BinaryLoader {
    type Handle;

    fn load_binary(&self, path: &Path) -> Result<Self::Handle, Error>;
}

/// Default capability set backed by the real filesystem and the host's
/// dynamic loader.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostPlatform;

impl HostPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for HostPlatform {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_entries(&self, path: &Path) -> Result<Vec<String>, Error> {
        let entries = std::fs::read_dir(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read directory")
                .with_path(path)
                .with_source(err)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read directory entry")
                    .with_path(path)
                    .with_source(err)
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

impl BinaryLoader for HostPlatform {
    type Handle = NativeAddon;

    fn load_binary(&self, path: &Path) -> Result<NativeAddon, Error> {
        // SAFETY: loading a shared object runs its initializers; the caller
        // vouches for the artifact by having built it into the package tree.
        let library = unsafe { Library::new(path) }.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to load native addon")
                .with_path(path)
                .with_source(err)
        })?;
        Ok(NativeAddon {
            library,
            path: path.to_path_buf(),
        })
    }
}

/// A loaded native addon. Ownership of the mapping passes to the caller;
/// dropping the handle unloads the library.
#[derive(Debug)]
pub struct NativeAddon {
    library: Library,
    path: PathBuf,
}

impl NativeAddon {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn library(&self) -> &Library {
        &self.library
    }
}

/// In-memory capability set for tests and dry runs. Paths are a flat set;
/// directories are implied by their descendants or added explicitly for the
/// empty case. Load calls are recorded and return the requested path.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
    loads: RefCell<Vec<PathBuf>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            self.dirs.insert(dir.to_path_buf());
            ancestor = dir.parent();
        }
        self.files.insert(path);
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            self.dirs.insert(dir.to_path_buf());
            ancestor = dir.parent();
        }
        self.dirs.insert(path);
        self
    }

    /// Paths handed to `load_binary` so far, in call order.
    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.borrow().clone()
    }
}

impl FileSystem for MemoryPlatform {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.contains(path)
    }

    fn list_entries(&self, path: &Path) -> Result<Vec<String>, Error> {
        if !self.dirs.contains(path) {
            return Err(Error::new(ErrorKind::Io)
                .with_message("failed to read directory")
                .with_path(path));
        }
        let mut names = BTreeSet::new();
        for candidate in self.files.iter().chain(self.dirs.iter()) {
            if candidate.parent() != Some(path) {
                continue;
            }
            if let Some(name) = candidate.file_name() {
                names.insert(name.to_string_lossy().into_owned());
            }
        }
        Ok(names.into_iter().collect())
    }
}

impl BinaryLoader for MemoryPlatform {
    type Handle = PathBuf;

    fn load_binary(&self, path: &Path) -> Result<PathBuf, Error> {
        if !self.files.contains(path) {
            return Err(Error::new(ErrorKind::Io)
                .with_message("failed to load native addon")
                .with_path(path));
        }
        self.loads.borrow_mut().push(path.to_path_buf());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryLoader, FileSystem, MemoryPlatform};
    use std::path::Path;

    #[test]
    fn memory_platform_implies_parent_directories() {
        let platform = MemoryPlatform::new().with_file("/p/build/Release/addon.node");

        assert!(platform.exists(Path::new("/p/build/Release/addon.node")));
        assert!(platform.exists(Path::new("/p/build/Release")));
        assert!(platform.exists(Path::new("/p/build")));
        assert!(platform.exists(Path::new("/p")));
        assert!(!platform.exists(Path::new("/p/build/Debug")));
    }

    #[test]
    fn memory_platform_lists_direct_children_sorted() {
        let platform = MemoryPlatform::new()
            .with_file("/p/build/Release/zeta.node")
            .with_file("/p/build/Release/alpha.node")
            .with_file("/p/build/Release/nested/ignored.txt");

        let names = platform
            .list_entries(Path::new("/p/build/Release"))
            .expect("list entries");
        assert_eq!(names, vec!["alpha.node", "nested", "zeta.node"]);
    }

    #[test]
    fn memory_platform_listing_fails_on_missing_directory() {
        let platform = MemoryPlatform::new().with_file("/p/package.json");
        let err = platform
            .list_entries(Path::new("/p/build"))
            .expect_err("missing directory must fail");
        assert_eq!(err.path().map(|p| p.as_path()), Some(Path::new("/p/build")));
    }

    #[test]
    fn memory_platform_records_loads() {
        let platform = MemoryPlatform::new().with_file("/p/a.node");

        let handle = platform
            .load_binary(Path::new("/p/a.node"))
            .expect("load recorded file");
        assert_eq!(handle, Path::new("/p/a.node"));
        assert_eq!(platform.loads(), vec![handle]);

        platform
            .load_binary(Path::new("/p/missing.node"))
            .expect_err("missing file must fail");
        assert_eq!(platform.loads().len(), 1);
    }
}
