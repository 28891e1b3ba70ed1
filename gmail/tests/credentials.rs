mod common;

use std::fs;

use chrono::{Duration, Utc};
use gmail::{CredentialProvider, Error, TokenFileConfig, TokenFileCredentials};
use serde_json::{json, Value};
use tempfile::tempdir;

use crate::common::serve_json_once;

#[test_log::test(tokio::test)]
async fn valid_token_from_file() {
    let dir = tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    fs::write(
        &token_file,
        json!({
            "token": "ya29.valid",
            "refresh_token": "1//refresh",
            "client_id": "id",
            "expiry": Utc::now() + Duration::hours(1),
        })
        .to_string(),
    )
    .unwrap();

    // the credentials file is only needed for a new authorization
    let config = TokenFileConfig::default()
        .with_token_file(&token_file)
        .with_credentials_file(dir.path().join("missing.json"));
    let credentials = TokenFileCredentials::new(config);

    assert_eq!(credentials.access_token().await.unwrap(), "ya29.valid");
    assert_eq!(credentials.access_token().await.unwrap(), "ya29.valid");
}

#[test_log::test(tokio::test)]
async fn refresh_expired_token() {
    let (url, server) = serve_json_once(
        "200 OK",
        json!({
            "access_token": "ya29.fresh",
            "token_type": "Bearer",
            "expires_in": 3599,
        })
        .to_string(),
    );

    let dir = tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    fs::write(
        &token_file,
        json!({
            "token": "ya29.expired",
            "refresh_token": "1//refresh",
            "token_uri": format!("{url}/token"),
            "client_id": "id",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/gmail.send"],
            "universe_domain": "googleapis.com",
            "expiry": Utc::now() - Duration::minutes(5),
        })
        .to_string(),
    )
    .unwrap();

    let config = TokenFileConfig::default().with_token_file(&token_file);
    let credentials = TokenFileCredentials::new(config);

    assert_eq!(credentials.access_token().await.unwrap(), "ya29.fresh");
    // served from memory, the fake server only answers once
    assert_eq!(credentials.access_token().await.unwrap(), "ya29.fresh");

    let req = server.join().unwrap();
    assert_eq!(req.request_line, "POST /token HTTP/1.1");
    let body = String::from_utf8(req.body).unwrap();
    assert!(body.contains("grant_type=refresh_token"), "{body}");
    assert!(body.contains("refresh_token=1%2F%2Frefresh"), "{body}");

    let saved: Value = serde_json::from_slice(&fs::read(&token_file).unwrap()).unwrap();
    assert_eq!(saved["token"], "ya29.fresh");
    assert_eq!(saved["refresh_token"], "1//refresh");
    assert_eq!(saved["universe_domain"], "googleapis.com");
    assert!(saved["expiry"].is_string());
}

#[test_log::test(tokio::test)]
async fn missing_credentials_file() {
    let dir = tempdir().unwrap();

    let config = TokenFileConfig::default()
        .with_token_file(dir.path().join("token.json"))
        .with_credentials_file(dir.path().join("credentials.json"));
    let credentials = TokenFileCredentials::new(config);

    let err = credentials.access_token().await.unwrap_err();
    assert!(matches!(err, Error::MissingCredentialsFileError(..)), "{err:?}");
    assert!(err.to_string().contains("GMAIL_CREDENTIALS_FILE"));
}

#[test_log::test(tokio::test)]
async fn invalid_token_file() {
    let dir = tempdir().unwrap();
    let token_file = dir.path().join("token.json");
    fs::write(&token_file, "not json").unwrap();

    let credentials =
        TokenFileCredentials::new(TokenFileConfig::default().with_token_file(&token_file));

    let err = credentials.access_token().await.unwrap_err();
    assert!(matches!(err, Error::ParseTokenFileError(..)), "{err:?}");
}
