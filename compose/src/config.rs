//! # Attachments configuration
//!
//! Module dedicated to the sandbox of path-based attachments: where
//! they may be read from, and how big they may be.

use std::{env, path::PathBuf};

use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable overriding the sandbox root.
pub const BASE_DIR_ENV: &str = "ATTACHMENTS_BASE_DIR";

/// Environment variable overriding the per-attachment size limit, in
/// megabytes.
pub const MAX_SIZE_ENV: &str = "MAX_ATTACHMENT_MB";

/// The default sandbox root.
pub const DEFAULT_BASE_DIR: &str = "/shared";

/// The default per-attachment size limit, in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 20;

const MB: u64 = 1024 * 1024;

/// The attachments configuration.
///
/// A single instance is shared by path resolution and by the
/// sandboxed read, so both always agree on the sandbox root.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct AttachmentsConfig {
    /// The sandbox root.
    ///
    /// Relative attachment paths are joined under it, and no
    /// attachment can be read from outside of it.
    pub base_dir: PathBuf,

    /// The maximum size of a single path-based attachment, in bytes.
    pub max_size: u64,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            max_size: DEFAULT_MAX_SIZE_MB * MB,
        }
    }
}

impl AttachmentsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration from the process environment.
    ///
    /// See [`BASE_DIR_ENV`] and [`MAX_SIZE_ENV`].
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::var(BASE_DIR_ENV).ok(), env::var(MAX_SIZE_ENV).ok())
    }

    /// Build the configuration from raw variable values, as they
    /// would be read from the environment.
    pub fn from_vars(base_dir: Option<String>, max_size_mb: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = base_dir.filter(|dir| !dir.trim().is_empty()) {
            config.base_dir = expand_path(&dir);
        }

        if let Some(mb) = max_size_mb.filter(|mb| !mb.trim().is_empty()) {
            let mb = mb
                .trim()
                .parse::<u64>()
                .map_err(|err| Error::InvalidMaxAttachmentSizeError(mb.clone(), err))?;
            config.max_size = mb.saturating_mul(MB);
        }

        debug!(
            base_dir = ?config.base_dir,
            max_size = config.max_size,
            "loaded attachments configuration"
        );

        Ok(config)
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Set the size limit, in bytes.
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Set the size limit, in megabytes.
    pub fn with_max_size_mb(self, mb: u64) -> Self {
        self.with_max_size(mb.saturating_mul(MB))
    }
}

fn expand_path(dir: &str) -> PathBuf {
    match shellexpand::full(dir) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            warn!("cannot expand attachments base dir {dir}: {err}");
            PathBuf::from(dir)
        }
    }
}
