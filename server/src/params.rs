//! Tool parameters, as described to MCP clients.

use compose::{AttachmentSpec, BodyFormat, SendRequest};
use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters of the `send_gmail` tool.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct SendGmailParams {
    /// Recipient, written verbatim in the To header.
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Either `plain` (default) or `html`.
    #[serde(default)]
    pub body_format: Option<String>,
    /// Files to attach, in order.
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentParams>>,
}

/// One attachment, given either by path or by inline content.
///
/// A path is resolved against the attachments base directory and
/// must stay inside it. Inline content requires a filename.
#[derive(Clone, Debug, Default, Deserialize, JsonSchema)]
pub struct AttachmentParams {
    /// Absolute, or relative to the attachments base directory.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    /// Guessed from the filename when missing.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Standard base64 content.
    #[serde(default)]
    pub content_base64: Option<String>,
}

impl From<AttachmentParams> for AttachmentSpec {
    fn from(params: AttachmentParams) -> Self {
        AttachmentSpec {
            path: params.path,
            filename: params.filename,
            mime_type: params.mime_type,
            content_base64: params.content_base64,
        }
    }
}

impl TryFrom<SendGmailParams> for SendRequest {
    type Error = compose::Error;

    fn try_from(params: SendGmailParams) -> compose::Result<Self> {
        let body_format = match params.body_format.as_deref() {
            None | Some("") => BodyFormat::default(),
            Some(format) => format.parse()?,
        };

        Ok(SendRequest {
            to: params.to,
            subject: params.subject,
            body: params.body,
            body_format,
            attachments: params
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(AttachmentSpec::from)
                .collect(),
        })
    }
}
