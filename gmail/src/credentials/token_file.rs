//! # Token file credentials
//!
//! Credentials persisted in an authorized-user JSON file, the layout
//! Google client libraries use. The file is created by the
//! authorization code grant the first time, then updated every time
//! the access token gets refreshed.

use std::{env, io, path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauth::v2_0::{AuthorizationCodeGrant, Client, RedirectServer, RefreshAccessToken, TokenSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use crate::{CredentialProvider, Error, Result};

pub const TOKEN_FILE_ENV: &str = "GMAIL_TOKEN_FILE";
pub const CREDENTIALS_FILE_ENV: &str = "GMAIL_CREDENTIALS_FILE";

pub const DEFAULT_TOKEN_FILE: &str = "token.json";
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// The only scope needed to send messages.
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Access tokens expiring within this delay are considered expired.
const EXPIRY_SKEW: Duration = Duration::from_secs(10);

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_owned()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_owned()
}

/// The token file configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenFileConfig {
    /// Where the authorized user is persisted.
    pub token_file: PathBuf,

    /// The OAuth client secrets, as downloaded from the Google Cloud
    /// console. Only read when a new authorization is needed.
    pub credentials_file: PathBuf,

    pub scopes: Vec<String>,

    /// Host of the loopback redirection server.
    pub redirect_host: String,

    /// Port of the loopback redirection server, `0` meaning any free
    /// port.
    pub redirect_port: u16,
}

impl Default for TokenFileConfig {
    fn default() -> Self {
        Self {
            token_file: DEFAULT_TOKEN_FILE.into(),
            credentials_file: DEFAULT_CREDENTIALS_FILE.into(),
            scopes: vec![GMAIL_SEND_SCOPE.to_owned()],
            redirect_host: "localhost".to_owned(),
            redirect_port: 0,
        }
    }
}

impl TokenFileConfig {
    /// Read file locations from `GMAIL_TOKEN_FILE` and
    /// `GMAIL_CREDENTIALS_FILE`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var(TOKEN_FILE_ENV).ok(),
            env::var(CREDENTIALS_FILE_ENV).ok(),
        )
    }

    /// Same as [`TokenFileConfig::from_env`], from already-read
    /// values. Empty values count as absent.
    pub fn from_vars(token_file: Option<String>, credentials_file: Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = token_file.filter(|path| !path.trim().is_empty()) {
            config.token_file = path.into();
        }

        if let Some(path) = credentials_file.filter(|path| !path.trim().is_empty()) {
            config.credentials_file = path.into();
        }

        config
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = path.into();
        self
    }

    pub fn with_redirect(mut self, host: impl ToString, port: u16) -> Self {
        self.redirect_host = host.to_string();
        self.redirect_port = port;
        self
    }
}

/// The content of a token file.
///
/// Unknown keys are kept as they are, so that files shared with
/// other tools survive a round trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizedUser {
    /// Whether the access token can still be used at the given time.
    ///
    /// A token without expiry is considered valid.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_none() {
            return false;
        }

        match self.expiry {
            None => true,
            Some(expiry) => match chrono::Duration::from_std(EXPIRY_SKEW) {
                Ok(skew) => expiry - skew > now,
                Err(_) => expiry > now,
            },
        }
    }

    fn apply(&mut self, tokens: TokenSet, now: DateTime<Utc>) {
        self.token = Some(tokens.access_token);
        if tokens.refresh_token.is_some() {
            self.refresh_token = tokens.refresh_token;
        }
        self.expiry = tokens
            .expires_in
            .and_then(|expires_in| chrono::Duration::from_std(expires_in).ok())
            .map(|expires_in| now + expires_in);
    }
}

/// The OAuth client secrets of an installed or web application.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// Credentials backed by a token file.
///
/// The authorized user is loaded lazily then kept in memory. Access
/// tokens are refreshed when they expire, and a new authorization
/// is requested when no refresh token is available. Concurrent
/// callers wait for each other, so that one refresh happens at a
/// time.
#[derive(Debug, Default)]
pub struct TokenFileCredentials {
    config: TokenFileConfig,
    user: Mutex<Option<AuthorizedUser>>,
}

impl TokenFileCredentials {
    pub fn new(config: TokenFileConfig) -> Self {
        Self {
            config,
            user: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TokenFileConfig {
        &self.config
    }

    async fn load(&self) -> Result<Option<AuthorizedUser>> {
        let path = &self.config.token_file;

        let contents = match fs::read(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no token file found at {}", path.display());
                return Ok(None);
            }
            Err(err) => return Err(Error::ReadTokenFileError(err, path.clone())),
        };

        let user = serde_json::from_slice(&contents)
            .map_err(|err| Error::ParseTokenFileError(err, path.clone()))?;

        debug!("token file loaded from {}", path.display());
        Ok(Some(user))
    }

    async fn save(&self, user: &AuthorizedUser) -> Result<()> {
        let path = &self.config.token_file;
        let contents = serde_json::to_vec_pretty(user).map_err(Error::SerializeTokenError)?;

        fs::write(path, contents)
            .await
            .map_err(|err| Error::WriteTokenFileError(err, path.clone()))?;

        debug!("token file saved at {}", path.display());
        Ok(())
    }

    async fn read_client_secret(&self) -> Result<ClientSecret> {
        let path = &self.config.credentials_file;

        let contents = match fs::read(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::MissingCredentialsFileError(path.clone()));
            }
            Err(err) => return Err(Error::ReadCredentialsFileError(err, path.clone())),
        };

        let secrets: ClientSecretsFile = serde_json::from_slice(&contents)
            .map_err(|err| Error::ParseCredentialsFileError(err, path.clone()))?;

        secrets
            .installed
            .or(secrets.web)
            .ok_or_else(|| Error::MissingClientSecretError(path.clone()))
    }

    async fn refresh(&self, mut user: AuthorizedUser) -> Result<AuthorizedUser> {
        let Some(refresh_token) = user.refresh_token.clone() else {
            return Err(Error::MissingRefreshTokenError);
        };

        // the redirection is never used by this flow
        let client = Client::new(
            &user.client_id,
            user.client_secret.as_ref(),
            GOOGLE_AUTH_URI,
            &user.token_uri,
            "http",
            &self.config.redirect_host,
            self.config.redirect_port,
        )
        .map_err(Error::BuildOAuthClientError)?;

        let tokens = RefreshAccessToken::new()
            .refresh_access_token(&client, refresh_token)
            .await
            .map_err(Error::RefreshAccessTokenError)?;

        user.apply(tokens, Utc::now());
        Ok(user)
    }

    async fn authorize(&self) -> Result<AuthorizedUser> {
        let secret = self.read_client_secret().await?;

        let server = RedirectServer::bind(&self.config.redirect_host, self.config.redirect_port)
            .await
            .map_err(Error::BindRedirectServerError)?;

        let client = Client::new(
            &secret.client_id,
            secret.client_secret.as_ref(),
            &secret.auth_uri,
            &secret.token_uri,
            "http",
            server.host(),
            server.port(),
        )
        .map_err(Error::BuildOAuthClientError)?;

        let mut grant = AuthorizationCodeGrant::new()
            .with_pkce()
            .with_extra_param("access_type", "offline")
            .with_extra_param("prompt", "consent");
        for scope in &self.config.scopes {
            grant = grant.with_scope(scope);
        }

        let (redirect_url, csrf_state) = grant.get_redirect_url(&client);
        info!("open the following url to grant gmail access: {redirect_url}");

        let tokens = grant
            .wait_for_redirection(&client, server, csrf_state)
            .await
            .map_err(Error::AuthorizeError)?;

        let mut user = AuthorizedUser {
            token_uri: secret.token_uri,
            client_id: secret.client_id,
            client_secret: secret.client_secret,
            scopes: self.config.scopes.clone(),
            ..Default::default()
        };
        user.apply(tokens, Utc::now());

        Ok(user)
    }
}

#[async_trait]
impl CredentialProvider for TokenFileCredentials {
    async fn access_token(&self) -> Result<String> {
        let mut user = self.user.lock().await;

        if user.is_none() {
            *user = self.load().await?;
        }

        if let Some(token) = user
            .as_ref()
            .filter(|user| user.is_valid(Utc::now()))
            .and_then(|user| user.token.clone())
        {
            return Ok(token);
        }

        let fresh = match user.take() {
            Some(prev) if prev.refresh_token.is_some() => {
                info!("gmail access token expired, refreshing it");
                self.refresh(prev).await?
            }
            _ => {
                info!("no usable gmail token, requesting a new authorization");
                self.authorize().await?
            }
        };

        self.save(&fresh).await?;

        let token = fresh.token.clone().unwrap_or_default();
        *user = Some(fresh);
        Ok(token)
    }
}
