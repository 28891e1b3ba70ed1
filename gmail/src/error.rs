use std::{io, path::PathBuf};

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read token file at {1:?}")]
    ReadTokenFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse token file at {1:?}")]
    ParseTokenFileError(#[source] serde_json::Error, PathBuf),
    #[error("cannot serialize token")]
    SerializeTokenError(#[source] serde_json::Error),
    #[error("cannot write token file at {1:?}")]
    WriteTokenFileError(#[source] io::Error, PathBuf),

    #[error("credentials file not found: {0:?}; set GMAIL_CREDENTIALS_FILE or place credentials.json next to the server")]
    MissingCredentialsFileError(PathBuf),
    #[error("cannot read credentials file at {1:?}")]
    ReadCredentialsFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse credentials file at {1:?}")]
    ParseCredentialsFileError(#[source] serde_json::Error, PathBuf),
    #[error("cannot find installed or web client in credentials file at {0:?}")]
    MissingClientSecretError(PathBuf),

    #[error("cannot build oauth client")]
    BuildOAuthClientError(#[source] oauth::v2_0::Error),
    #[error("cannot start oauth redirect server")]
    BindRedirectServerError(#[source] oauth::v2_0::Error),
    #[error("cannot authorize gmail access")]
    AuthorizeError(#[source] oauth::v2_0::Error),
    #[error("cannot refresh gmail access token")]
    RefreshAccessTokenError(#[source] oauth::v2_0::Error),
    #[error("cannot refresh gmail access token: no refresh token")]
    MissingRefreshTokenError,

    #[error("cannot send message through gmail api")]
    SendMessageError(#[source] http::Error),
    #[error("cannot send message through gmail api: {1} (status {0})")]
    GmailApiError(u16, String),
    #[error("cannot parse gmail api response")]
    ParseSendMessageResponseError(#[source] http::ureq::Error),

    #[error("cannot build message")]
    BuildMessageTaskError(#[source] tokio::task::JoinError),
    #[error(transparent)]
    ComposeError(#[from] compose::Error),
}
