//! Authorization Grant Code flow helper, as defined in the
//! [RFC6749](https://datatracker.ietf.org/doc/html/rfc6749#section-1.3.1)

use oauth2::{
    url::Url, AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, Scope,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
};
use tracing::debug;

use super::{Client, Error, Result, TokenSet};

/// The loopback server receiving the authorization redirection.
///
/// Binding happens before building the [`Client`], so that an
/// ephemeral port (`0`) can be used: the actual port is then known
/// and can be part of the redirect URL.
#[derive(Debug)]
pub struct RedirectServer {
    listener: TcpListener,
    host: String,
    port: u16,
}

impl RedirectServer {
    pub async fn bind(host: impl ToString, port: u16) -> Result<Self> {
        let host = host.to_string();

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|err| Error::BindRedirectServerError(host.clone(), port, err))?;
        let port = listener
            .local_addr()
            .map_err(|err| Error::BindRedirectServerError(host.clone(), port, err))?
            .port();

        debug!("redirect server listening on {host}:{port}");
        Ok(Self {
            listener,
            host,
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// OAuth 2.0 Authorization Code Grant flow builder.
///
/// The first step (once the builder is configured) is to get the
/// redirect URL by calling
/// [`AuthorizationCodeGrant::get_redirect_url`].
///
/// The last step is to wait for the user to follow the redirect URL
/// in order to extract the access token and the refresh token by
/// calling [`AuthorizationCodeGrant::wait_for_redirection`].
#[derive(Debug, Default)]
pub struct AuthorizationCodeGrant {
    scopes: Vec<Scope>,
    pkce: Option<(PkceCodeChallenge, PkceCodeVerifier)>,
    extra_params: Vec<(String, String)>,
}

impl AuthorizationCodeGrant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: impl ToString) -> Self {
        self.scopes.push(Scope::new(scope.to_string()));
        self
    }

    pub fn with_pkce(mut self) -> Self {
        self.pkce = Some(PkceCodeChallenge::new_random_sha256());
        self
    }

    /// Add a provider-specific parameter to the redirect URL, like
    /// Google's `access_type=offline`.
    pub fn with_extra_param(mut self, key: impl ToString, val: impl ToString) -> Self {
        self.extra_params.push((key.to_string(), val.to_string()));
        self
    }

    /// Generate the redirect URL.
    pub fn get_redirect_url(&self, client: &Client) -> (Url, CsrfToken) {
        let mut url_builder = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.clone());

        for (key, val) in &self.extra_params {
            url_builder = url_builder.add_extra_param(key.clone(), val.clone());
        }

        if let Some((pkce_challenge, _)) = &self.pkce {
            url_builder = url_builder.set_pkce_challenge(pkce_challenge.clone());
        }

        url_builder.url()
    }

    /// Wait for the user to follow the redirect URL generated by
    /// [`AuthorizationCodeGrant::get_redirect_url`], then exchange
    /// the received code with an access token and a refresh token.
    pub async fn wait_for_redirection(
        self,
        client: &Client,
        server: RedirectServer,
        csrf_state: CsrfToken,
    ) -> Result<TokenSet> {
        // listen for one single connection
        let (stream, _) = server
            .listener
            .accept()
            .await
            .map_err(Error::AcceptRedirectServerError)?;
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .await
            .map_err(Error::ReadRedirectRequestError)?;

        let code = extract_code(&request_line, &csrf_state);

        // write a basic http response in plain text
        let body = match &code {
            Ok(_) => "Authentication successful! You can close this window.",
            Err(_) => "Authentication failed! Please check the server logs.",
        };
        let res = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        reader
            .get_mut()
            .write_all(res.as_bytes())
            .await
            .map_err(Error::WriteRedirectResponseError)?;

        let code = code?;

        // exchange the code for an access token and a refresh token
        let mut req = client.exchange_code(code);
        if let Some((_, pkce_verifier)) = self.pkce {
            req = req.set_pkce_verifier(pkce_verifier);
        }

        let res = req
            .request_async(&Client::send_oauth2_request)
            .await
            .map_err(Box::new)
            .map_err(Error::ExchangeCodeError)?;

        Ok(TokenSet::from(&res))
    }
}

/// Extract the authorization code from the request line of the
/// redirection, after checking its state.
fn extract_code(request_line: &str, csrf_state: &CsrfToken) -> Result<AuthorizationCode> {
    let redirect_url = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::MissingRedirectUrlError(request_line.to_owned()))?;
    let redirect_url = format!("http://localhost{redirect_url}");
    let redirect_url = Url::parse(&redirect_url)
        .map_err(|err| Error::ParseRedirectUrlError(err, redirect_url.clone()))?;

    if let Some((_, err)) = redirect_url.query_pairs().find(|(key, _)| key == "error") {
        return Err(Error::AuthorizationDeniedError(err.into_owned()));
    }

    let (_, state) = redirect_url
        .query_pairs()
        .find(|(key, _)| key == "state")
        .ok_or_else(|| Error::FindStateInRedirectUrlError(redirect_url.clone()))?;

    if state != csrf_state.secret().as_str() {
        return Err(Error::InvalidStateError(
            state.into_owned(),
            csrf_state.secret().to_owned(),
        ));
    }

    let (_, code) = redirect_url
        .query_pairs()
        .find(|(key, _)| key == "code")
        .ok_or_else(|| Error::FindCodeInRedirectUrlError(redirect_url.clone()))?;

    Ok(AuthorizationCode::new(code.into_owned()))
}
