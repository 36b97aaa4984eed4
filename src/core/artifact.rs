//! Purpose: Locate the single compiled addon file inside a variant directory.
//! Exports: `resolve_addon_artifact`, `DEFAULT_ADDON_SUFFIX`.
//! Role: Last resolution stage before the load capability is invoked.
//! Invariants: Exactly one matching file; ambiguity is a hard failure, no tie-break.

use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::platform::FileSystem;

/// Recognized native-binary suffix in the target ecosystem.
pub const DEFAULT_ADDON_SUFFIX: &str = ".node";

/// Returns the name of the single entry of `variant_dir` ending with
/// `suffix`. The caller resolves it against `variant_dir` for the load.
pub fn resolve_addon_artifact(
    fs: &impl FileSystem,
    variant_dir: &Path,
    suffix: &str,
) -> Result<String, Error> {
    let entries = fs.list_entries(variant_dir)?;
    let mut matches: Vec<String> = entries
        .into_iter()
        .filter(|name| name.ends_with(suffix))
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(Error::new(ErrorKind::ArtifactMissing).with_message(format!(
            "no {suffix} addon file found in build folder \"{}\"",
            variant_dir.display()
        ))),
        _ => Err(Error::new(ErrorKind::ArtifactAmbiguous).with_message(format!(
            "multiple {suffix} addon files found in build folder \"{}\", cannot determine which to load",
            variant_dir.display()
        ))),
    }
}
