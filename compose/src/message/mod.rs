//! # Message module
//!
//! Module dedicated to outgoing messages: the [`SendRequest`]
//! describing them, the [`MessageBuilder`] assembling them and the
//! [`EncodedMessage`] it produces.

mod builder;

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::URL_SAFE, Engine};

use crate::{AttachmentSpec, Error, Result};

#[doc(inline)]
pub use self::builder::MessageBuilder;

/// The format of the message body.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum BodyFormat {
    #[default]
    Plain,
    Html,
}

impl BodyFormat {
    /// The MIME type of a body written in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Plain => "text/plain",
            Self::Html => "text/html",
        }
    }
}

impl FromStr for BodyFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("plain") => Ok(Self::Plain),
            s if s.eq_ignore_ascii_case("html") => Ok(Self::Html),
            s => Err(Error::ParseBodyFormatError(s.to_owned())),
        }
    }
}

impl fmt::Display for BodyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// The request to send one message.
///
/// Attachments keep their order in the built message.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize, serde::Deserialize))]
pub struct SendRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[cfg_attr(feature = "derive", serde(default))]
    pub body_format: BodyFormat,
    #[cfg_attr(feature = "derive", serde(default))]
    pub attachments: Vec<AttachmentSpec>,
}

impl SendRequest {
    pub fn new(to: impl ToString, subject: impl ToString, body: impl ToString) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn with_body_format(mut self, format: BodyFormat) -> Self {
        self.body_format = format;
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentSpec) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_attachments(
        mut self,
        attachments: impl IntoIterator<Item = AttachmentSpec>,
    ) -> Self {
        self.attachments.extend(attachments);
        self
    }
}

/// The transport-ready message.
///
/// Holds the URL-safe base64 encoding of the full MIME message, the
/// form expected by the Gmail API `raw` field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedMessage(String);

impl EncodedMessage {
    /// Encode the given raw MIME message.
    pub fn encode(mime_msg: impl AsRef<[u8]>) -> Self {
        Self(URL_SAFE.encode(mime_msg))
    }

    /// Decode back the raw MIME message.
    pub fn decode(&self) -> Result<Vec<u8>> {
        URL_SAFE.decode(&self.0).map_err(Error::DecodeMessageError)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EncodedMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrap an already encoded message, as found in a `raw` field.
impl From<String> for EncodedMessage {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<EncodedMessage> for String {
    fn from(msg: EncodedMessage) -> Self {
        msg.0
    }
}

#[cfg(test)]
mod tests {
    use super::{BodyFormat, EncodedMessage};

    #[test]
    fn body_format_from_str() {
        assert_eq!("plain".parse::<BodyFormat>().unwrap(), BodyFormat::Plain);
        assert_eq!(" HTML ".parse::<BodyFormat>().unwrap(), BodyFormat::Html);
        assert!("markdown".parse::<BodyFormat>().is_err());
        assert_eq!(BodyFormat::default(), BodyFormat::Plain);
    }

    #[test]
    fn encoded_message_is_url_safe() {
        // 0xfb 0xff encodes to "+/8=" with the standard alphabet
        let encoded = EncodedMessage::encode([0xfb, 0xff]);

        assert_eq!(encoded.as_str(), "-_8=");
        assert_eq!(encoded.decode().unwrap(), [0xfb, 0xff]);
    }
}
