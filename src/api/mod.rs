//! Purpose: Define the stable public Rust API boundary for Loadstone.
//! Exports: Loader, capability traits, guard, and error types.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path bindings should rely on.

mod loader;

pub use crate::core::artifact::DEFAULT_ADDON_SUFFIX;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::guard::{LeakInfo, ResourceGuard, leak_error, leak_message};
pub use crate::core::platform::{
    BinaryLoader, FileSystem, HostPlatform, MemoryPlatform, NativeAddon,
};
pub use crate::core::pointer::{PointerBound, format_pointer};
pub use crate::core::root::{DEFAULT_MAX_HOPS, MANIFEST_FILE};
pub use crate::core::variant::BuildVariant;
pub use loader::{AddonLoader, ResolvedArtifact};
