//! Purpose: Public loader orchestrating the resolution chain and the load call.
//! Exports: `AddonLoader`, `ResolvedArtifact`.
//! Role: Stable entry point for hosts bootstrapping a native addon.
//! Invariants: No caching and no retries; every call re-runs the full chain.
//! Invariants: Failures surface to the immediate caller with their cause intact.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::artifact::{DEFAULT_ADDON_SUFFIX, resolve_addon_artifact};
use crate::core::error::{Error, ErrorKind};
use crate::core::platform::{BinaryLoader, FileSystem};
use crate::core::root::{DEFAULT_MAX_HOPS, find_package_root};
use crate::core::variant::{BuildVariant, resolve_build_variant};

/// Outcome of a resolution pass, before any load happens.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedArtifact {
    pub package_root: PathBuf,
    pub variant: BuildVariant,
    pub file_name: String,
    pub path: PathBuf,
}

/// Resolves and loads the compiled addon for the package containing a module.
///
/// Construct it with the capability set and the absolute path of the module
/// performing the resolution; the upward search starts at that module's
/// directory.
#[derive(Clone, Debug)]
pub struct AddonLoader<P> {
    platform: P,
    module_path: PathBuf,
    max_hops: usize,
    artifact_suffix: String,
}

impl<P> AddonLoader<P> {
    pub fn new(platform: P, module_path: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            module_path: module_path.into(),
            max_hops: DEFAULT_MAX_HOPS,
            artifact_suffix: DEFAULT_ADDON_SUFFIX.to_string(),
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_artifact_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.artifact_suffix = suffix.into();
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn origin_dir(&self) -> &Path {
        self.module_path
            .parent()
            .unwrap_or_else(|| self.module_path.as_path())
    }
}

impl<P: FileSystem + BinaryLoader> AddonLoader<P> {
    /// Runs the resolution chain without loading anything.
    pub fn resolve(&self, relative_build_folder: impl AsRef<Path>) -> Result<ResolvedArtifact, Error> {
        let root = find_package_root(&self.platform, self.origin_dir(), self.max_hops)
            .map_err(|err| {
                Error::new(ErrorKind::RootUnresolvable)
                    .with_message("could not find our package root")
                    .with_hint(
                        "Keep the package layout intact and make sure the native addon \
                         is built at the expected relative path.",
                    )
                    .with_source(err)
            })?;

        let build_dir = root.join(relative_build_folder.as_ref());
        if !self.platform.exists(&build_dir) {
            return Err(Error::new(ErrorKind::BuildFolderMissing).with_message(format!(
                "no build folder found at our package root \"{}\", make sure to build the native addon first",
                build_dir.display()
            )));
        }

        let variant = resolve_build_variant(&self.platform, &build_dir)?;
        let variant_dir = build_dir.join(variant.dir_name());
        let file_name =
            resolve_addon_artifact(&self.platform, &variant_dir, &self.artifact_suffix)?;
        let path = variant_dir.join(&file_name);

        tracing::debug!(
            root = %root.display(),
            variant = variant.dir_name(),
            artifact = %file_name,
            "resolved native addon"
        );

        Ok(ResolvedArtifact {
            package_root: root,
            variant,
            file_name,
            path,
        })
    }

    /// Resolves the addon and invokes the load capability, returning its
    /// handle unmodified.
    pub fn load_relative_to_package_root(
        &self,
        relative_build_folder: impl AsRef<Path>,
    ) -> Result<P::Handle, Error> {
        let resolved = self.resolve(relative_build_folder)?;
        self.platform.load_binary(&resolved.path)
    }
}
