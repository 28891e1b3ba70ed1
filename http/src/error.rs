//! # Error
//!
//! Module dedicated to HTTP errors. It contains an [`Error`] enum
//! based on [`thiserror::Error`] and a type alias [`Result`].

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot send http request")]
    SendRequestError(#[source] ureq::Error),
    #[error("cannot read http response body")]
    ReadResponseBodyError(#[source] ureq::Error),
    #[error("cannot build http response")]
    BuildResponseError(#[source] ureq::http::Error),

    #[error(transparent)]
    JoinError(#[from] tokio::task::JoinError),
}
