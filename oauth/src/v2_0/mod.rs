//! This module provides helpers to simplify OAuth 2.0 flows, based on
//! the [RFC6749](https://datatracker.ietf.org/doc/html/rfc6749).
//!
//! The usual sequence for an installed application is to run the
//! [`AuthorizationCodeGrant`] once, persist the refresh token, then
//! use [`RefreshAccessToken`] whenever the access token expires.

pub mod authorization_code_grant;
pub mod client;
mod error;
pub mod refresh_access_token;

use std::time::Duration;

use oauth2::{basic::BasicTokenResponse, TokenResponse};

#[doc(inline)]
pub use self::{
    authorization_code_grant::{AuthorizationCodeGrant, RedirectServer},
    client::Client,
    error::{Error, Result},
    refresh_access_token::RefreshAccessToken,
};

/// The tokens issued by an authorization server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenSet {
    /// The access token, to be sent as bearer token.
    pub access_token: String,

    /// The refresh token, if the server issued one.
    pub refresh_token: Option<String>,

    /// The lifetime of the access token, if the server told it.
    pub expires_in: Option<Duration>,
}

impl From<&BasicTokenResponse> for TokenSet {
    fn from(res: &BasicTokenResponse) -> Self {
        Self {
            access_token: res.access_token().secret().to_owned(),
            refresh_token: res.refresh_token().map(|t| t.secret().clone()),
            expires_in: res.expires_in(),
        }
    }
}
