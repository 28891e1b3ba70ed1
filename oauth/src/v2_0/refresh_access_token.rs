//! Refresh Access Token flow helper, as defined in the
//! [RFC6749](https://datatracker.ietf.org/doc/html/rfc6749#section-6)

use oauth2::{RefreshToken, Scope};
use tracing::debug;

use super::{Client, Error, Result, TokenSet};

/// OAuth 2.0 Refresh Access Token flow builder. This flow exchange a
/// refresh token for a new access token and maybe a new refresh
/// token.
#[derive(Debug, Default)]
pub struct RefreshAccessToken {
    scopes: Vec<Scope>,
}

impl RefreshAccessToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow the scopes of the refreshed access token.
    pub fn with_scope(mut self, scope: impl ToString) -> Self {
        self.scopes.push(Scope::new(scope.to_string()));
        self
    }

    pub async fn refresh_access_token(
        &self,
        client: &Client,
        refresh_token: impl ToString,
    ) -> Result<TokenSet> {
        let refresh_token = RefreshToken::new(refresh_token.to_string());

        let res = client
            .exchange_refresh_token(&refresh_token)
            .add_scopes(self.scopes.clone())
            .request_async(&Client::send_oauth2_request)
            .await
            .map_err(Box::new)
            .map_err(Error::RefreshAccessTokenError)?;

        debug!("access token refreshed");
        Ok(TokenSet::from(&res))
    }
}
