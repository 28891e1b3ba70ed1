//! # Sandboxed attachment reader
//!
//! Module dedicated to reading attachment contents from the file
//! system without leaving the sandbox root.

use std::{
    env,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Error, Result};

use super::path::normalize;

/// Read the whole file at the given path.
///
/// The read fails when the path, once made absolute, is neither the
/// sandbox root itself nor one of its descendants. The check is done
/// twice: lexically first, so that escapes are reported even for
/// missing files, then on the canonical paths, so that symlinks
/// cannot point outside of the sandbox.
///
/// The size is checked against `max_size` before reading contents.
pub fn read(path: impl AsRef<Path>, base_dir: impl AsRef<Path>, max_size: u64) -> Result<Vec<u8>> {
    let path = absolute(path.as_ref())?;
    let base_dir = absolute(base_dir.as_ref())?;

    let (path, base_dir) = (normalize(&path), normalize(&base_dir));
    ensure_contained(&path, &base_dir)?;

    let path = path
        .canonicalize()
        .map_err(|err| Error::AttachmentReadError(err, path.clone()))?;
    let base_dir = base_dir
        .canonicalize()
        .map_err(|err| Error::AttachmentReadError(err, base_dir.clone()))?;
    ensure_contained(&path, &base_dir)?;

    let file = File::open(&path).map_err(|err| Error::AttachmentReadError(err, path.clone()))?;
    let size = file
        .metadata()
        .map_err(|err| Error::AttachmentReadError(err, path.clone()))?
        .len();

    if size > max_size {
        return Err(Error::AttachmentTooLargeError(path, size, max_size));
    }

    // the file may grow between the check and the read
    let mut data = Vec::with_capacity(size as usize);
    file.take(max_size.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(|err| Error::AttachmentReadError(err, path.clone()))?;

    if data.len() as u64 > max_size {
        return Err(Error::AttachmentTooLargeError(path, data.len() as u64, max_size));
    }

    debug!("read {} bytes from attachment at {path:?}", data.len());
    Ok(data)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let cwd = env::current_dir().map_err(|err| Error::AttachmentReadError(err, path.to_owned()))?;
    Ok(cwd.join(path))
}

fn ensure_contained(path: &Path, base_dir: &Path) -> Result<()> {
    if path.starts_with(base_dir) {
        Ok(())
    } else {
        debug!("attachment path {path:?} escapes base dir {base_dir:?}");
        Err(Error::PathEscapeError(path.to_owned(), base_dir.to_owned()))
    }
}
