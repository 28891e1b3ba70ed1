//! # Credentials
//!
//! Module dedicated to the OAuth 2.0 access tokens sent along with
//! Gmail API requests.

pub mod token_file;

use async_trait::async_trait;

use crate::Result;

/// Provider of Gmail access tokens.
///
/// Implementations are free to cache, refresh or interactively
/// obtain tokens: callers only ask for one right before a request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get an access token valid for at least the next request.
    async fn access_token(&self) -> Result<String>;
}

/// Credentials made of one fixed access token.
///
/// Useful when the token is managed outside of the process, or in
/// tests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl ToString) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialProvider, StaticCredentials};

    #[test_log::test(tokio::test)]
    async fn static_token() {
        let credentials = StaticCredentials::new("ya29.token");
        assert_eq!(credentials.access_token().await.unwrap(), "ya29.token");
    }
}
