use oauth2::{
    basic::BasicErrorResponseType,
    url::{ParseError, Url},
    RequestTokenError, StandardErrorResponse,
};
use thiserror::Error;

/// The global `Result` alias of the module.
pub type Result<T> = std::result::Result<T, Error>;

/// The token request error, as returned by the [`oauth2`] crate.
pub type RequestTokenErr =
    RequestTokenError<Error, StandardErrorResponse<BasicErrorResponseType>>;

/// The global `Error` enum of the module.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read response body")]
    ReadResponseBodyError(#[source] http::Error),
    #[error("cannot send {0} request: method not supported")]
    UnsupportedMethodError(String),
    #[error("cannot build auth url")]
    BuildAuthUrlError(#[source] ParseError),
    #[error("cannot build token url")]
    BuildTokenUrlError(#[source] ParseError),
    #[error("cannot build redirect url")]
    BuildRedirectUrlError(#[source] ParseError),
    #[error("cannot bind redirect server at {0}:{1}")]
    BindRedirectServerError(String, u16, #[source] std::io::Error),
    #[error("cannot accept redirect server connections")]
    AcceptRedirectServerError(#[source] std::io::Error),
    #[error("cannot read redirection request")]
    ReadRedirectRequestError(#[source] std::io::Error),
    #[error("cannot write redirection response")]
    WriteRedirectResponseError(#[source] std::io::Error),
    #[error("invalid state {0}: expected {1}")]
    InvalidStateError(String, String),
    #[error("missing redirect url from {0}")]
    MissingRedirectUrlError(String),
    #[error("cannot parse redirect url {1}")]
    ParseRedirectUrlError(#[source] ParseError, String),
    #[error("cannot find code from redirect url {0}")]
    FindCodeInRedirectUrlError(Url),
    #[error("cannot find state from redirect url {0}")]
    FindStateInRedirectUrlError(Url),
    #[error("authorization denied by the user: {0}")]
    AuthorizationDeniedError(String),

    #[error("cannot exchange code for access and refresh tokens")]
    ExchangeCodeError(#[source] Box<RequestTokenErr>),
    #[error("cannot refresh access token using the refresh token")]
    RefreshAccessTokenError(#[source] Box<RequestTokenErr>),

    #[error(transparent)]
    HttpError(#[from] http::Error),
}
