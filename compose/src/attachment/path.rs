//! # Attachment path resolution
//!
//! Module dedicated to mapping attachment paths onto the sandbox
//! root. Nothing here touches the file system.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Resolve the given attachment path against the sandbox root.
///
/// Absolute paths are returned unchanged, relative ones are joined
/// under `base_dir`. Whether the result exists, or stays inside the
/// sandbox, is checked later by the [reader](super::reader).
pub fn resolve(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.is_absolute() {
        return path.to_owned();
    }

    let resolved = base_dir.as_ref().join(path);
    debug!("resolved relative attachment path {path:?} to {resolved:?}");
    resolved
}

/// Lexically normalize the given path.
///
/// `.` components are dropped and `..` components pop their parent,
/// without following symlinks. A `..` at the root stays at the root.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                normalized.pop();
            }
            component => normalized.push(component.as_os_str()),
        }
    }

    normalized
}
