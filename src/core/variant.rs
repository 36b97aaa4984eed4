//! Purpose: Pick the single build variant present under a build output directory.
//! Exports: `BuildVariant`, `resolve_build_variant`.
//! Role: Second stage of the resolution chain.
//! Invariants: Exactly one of `Debug`/`Release` may exist; zero or two is an error.
//! Invariants: Failures wrap the specific cause so callers can tell the cases apart.

use std::path::Path;

use serde::Serialize;

use crate::core::error::{Error, ErrorKind};
use crate::core::platform::FileSystem;

/// The two recognized build-configuration subdirectories.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum BuildVariant {
    Debug,
    Release,
}

impl BuildVariant {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

/// Returns the single variant directory present under `build_dir`.
///
/// Release is matched ahead of Debug; with both present the resolution is
/// ambiguous and fails rather than preferring either.
pub fn resolve_build_variant(
    fs: &impl FileSystem,
    build_dir: &Path,
) -> Result<BuildVariant, Error> {
    let release = fs.exists(&build_dir.join(BuildVariant::Release.dir_name()));
    let debug = fs.exists(&build_dir.join(BuildVariant::Debug.dir_name()));

    let cause = match (release, debug) {
        (true, false) => return Ok(BuildVariant::Release),
        (false, true) => return Ok(BuildVariant::Debug),
        (false, false) => Error::new(ErrorKind::VariantAbsent).with_message(
            "neither Debug nor Release build folders found, make sure to build the native addon first",
        ),
        (true, true) => Error::new(ErrorKind::VariantAmbiguous).with_message(
            "both Debug and Release build folders exist, please remove one to avoid ambiguity",
        ),
    };

    Err(Error::new(ErrorKind::InvalidBuildStructure)
        .with_message(format!(
            "invalid build folder structure at \"{}\"",
            build_dir.display()
        ))
        .with_source(cause))
}
