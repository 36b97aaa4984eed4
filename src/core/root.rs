//! Purpose: Locate the package root by walking up from a starting directory.
//! Exports: `find_package_root`, `MANIFEST_FILE`, `DEFAULT_MAX_HOPS`.
//! Role: First stage of the resolution chain; pure over the filesystem capability.
//! Invariants: Nearest ancestor with a manifest wins.
//! Invariants: The walk uses structural parents, never symlink resolution.

use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};
use crate::core::platform::FileSystem;

/// Marker file identifying a package root.
pub const MANIFEST_FILE: &str = "package.json";

/// Directories inspected per search, starting directory included.
pub const DEFAULT_MAX_HOPS: usize = 10;

/// Returns the nearest ancestor of `start_dir` (itself included) containing
/// the manifest marker. The search inspects at most `max_hops` directories
/// and stops early when the filesystem root is reached.
pub fn find_package_root(
    fs: &impl FileSystem,
    start_dir: &Path,
    max_hops: usize,
) -> Result<PathBuf, Error> {
    let mut dir = start_dir.to_path_buf();
    for _ in 0..max_hops {
        if fs.exists(&dir.join(MANIFEST_FILE)) {
            tracing::debug!(root = %dir.display(), "found package root");
            return Ok(dir);
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
    Err(Error::new(ErrorKind::ManifestNotFound).with_message(format!(
        "Could not find package.json within {max_hops} directory levels from {}",
        start_dir.display()
    )))
}
