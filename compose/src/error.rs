use std::{io, num::ParseIntError, path::PathBuf};

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse maximum attachment size {0:?}: expected a whole number of megabytes")]
    InvalidMaxAttachmentSizeError(String, #[source] ParseIntError),

    #[error("attachment: provide either content_base64 or path, not both")]
    ConflictingSourceError,
    #[error("attachment requires content_base64 or path")]
    MissingSourceError,
    #[error("attachment with content_base64 requires filename")]
    MissingFilenameError,
    #[error("attachment path not allowed (outside base dir {1:?}): {0:?}")]
    PathEscapeError(PathBuf, PathBuf),
    #[error("attachment too large: {1} bytes (max {2} bytes) at {0:?}")]
    AttachmentTooLargeError(PathBuf, u64, u64),
    #[error("cannot read attachment at {1:?}")]
    AttachmentReadError(#[source] io::Error, PathBuf),
    #[error("cannot decode base64 content of attachment {1}")]
    InvalidBase64Error(#[source] base64::DecodeError, String),

    #[error("cannot parse body format {0:?}: expected plain or html")]
    ParseBodyFormatError(String),
    #[error("cannot build message: header {0} contains a line break")]
    InvalidHeaderError(&'static str),
    #[error("cannot build message")]
    BuildMessageError(#[source] io::Error),
    #[error("cannot decode encoded message")]
    DecodeMessageError(#[source] base64::DecodeError),
}
