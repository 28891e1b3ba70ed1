//! # Sender
//!
//! Module dedicated to the delivery of encoded messages.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use compose::EncodedMessage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{CredentialProvider, Error, Result};

/// The base URL of the Gmail REST API.
pub const GMAIL_API_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// The user identifier designating the authenticated user.
pub const DEFAULT_USER_ID: &str = "me";

/// The identifier the provider assigned to a sent message.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

/// Capability of sending already encoded messages.
#[async_trait]
pub trait SendMessage: Send + Sync {
    async fn send_message(&self, msg: &EncodedMessage) -> Result<MessageId>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    raw: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    id: String,
    #[serde(default)]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Extract the message of a Gmail API error body, falling back to the
/// raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(res) => res.error.message,
        Err(_) => body.trim().to_owned(),
    }
}

/// Sender posting messages to the Gmail REST API.
#[derive(Clone)]
pub struct GmailSender {
    http: http::Client,
    credentials: Arc<dyn CredentialProvider>,
    api_url: String,
    user_id: String,
}

impl GmailSender {
    pub fn new(credentials: impl CredentialProvider + 'static) -> Self {
        Self::from_arc(Arc::new(credentials))
    }

    pub fn from_arc(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http: http::Client::new(),
            credentials,
            api_url: GMAIL_API_URL.to_owned(),
            user_id: DEFAULT_USER_ID.to_owned(),
        }
    }

    /// Point the sender to another API base URL, without trailing
    /// slash.
    pub fn with_api_url(mut self, url: impl ToString) -> Self {
        self.api_url = url.to_string().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn with_http_client(mut self, http: http::Client) -> Self {
        self.http = http;
        self
    }

    fn send_url(&self) -> String {
        format!("{}/users/{}/messages/send", self.api_url, self.user_id)
    }
}

impl fmt::Debug for GmailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmailSender")
            .field("api_url", &self.api_url)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SendMessage for GmailSender {
    async fn send_message(&self, msg: &EncodedMessage) -> Result<MessageId> {
        let token = self.credentials.access_token().await?;
        let url = self.send_url();
        let body = SendMessageRequest {
            raw: msg.to_string(),
        };

        debug!("sending message to {url}");

        let mut res = self
            .http
            .send(move |agent| {
                agent
                    .post(&url)
                    .config()
                    .http_status_as_error(false)
                    .build()
                    .header("Authorization", format!("Bearer {token}"))
                    .send_json(body)
            })
            .await
            .map_err(Error::SendMessageError)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.body_mut().read_to_string().unwrap_or_default();
            return Err(Error::GmailApiError(status.as_u16(), api_error_message(&body)));
        }

        let res: SendMessageResponse = res
            .body_mut()
            .read_json()
            .map_err(Error::ParseSendMessageResponseError)?;

        info!(id = %res.id, thread_id = ?res.thread_id, "message sent");
        Ok(MessageId(res.id))
    }
}
