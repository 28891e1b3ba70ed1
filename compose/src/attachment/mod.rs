//! # Attachment module
//!
//! Module dedicated to attachments: how they are described by
//! callers ([`AttachmentSpec`]) and how they are reduced to concrete
//! filename, MIME type and bytes ([`ResolvedAttachment`]) by the
//! [`AttachmentResolver`].

pub mod mime;
pub mod path;
pub mod reader;

use std::{ffi::OsStr, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine};
use mail_builder::{headers::content_type::ContentType, mime::MimePart};
use tracing::debug;

use crate::{AttachmentsConfig, Error, Result};

/// Filename used when a path has no final segment to borrow one from.
const NONAME: &str = "noname";

/// Maximum length of a base64 line in a MIME body.
const BASE64_LINE_LEN: usize = 76;

/// The attachment description, as given by callers.
///
/// Exactly one of `content_base64` and `path` must be set. Empty
/// strings count as unset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "derive", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachmentSpec {
    /// The filename shown to the recipient.
    ///
    /// Mandatory for inline attachments, derived from the path
    /// otherwise.
    #[cfg_attr(
        feature = "derive",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub filename: Option<String>,

    /// The MIME type, guessed from the filename when missing.
    #[cfg_attr(
        feature = "derive",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub mime_type: Option<String>,

    /// The inline contents, encoded with the standard base64
    /// alphabet.
    #[cfg_attr(
        feature = "derive",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub content_base64: Option<String>,

    /// The path of the contents, relative to the sandbox root or
    /// absolute.
    #[cfg_attr(
        feature = "derive",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub path: Option<String>,
}

impl AttachmentSpec {
    /// Create a path-based attachment.
    pub fn from_path(path: impl ToString) -> Self {
        Self {
            path: Some(path.to_string()),
            ..Default::default()
        }
    }

    /// Create an inline attachment from base64-encoded contents.
    pub fn from_base64(filename: impl ToString, content_base64: impl ToString) -> Self {
        Self {
            filename: Some(filename.to_string()),
            content_base64: Some(content_base64.to_string()),
            ..Default::default()
        }
    }

    pub fn with_filename(mut self, filename: impl ToString) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl ToString) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }
}

/// The attachment reduced to what the message needs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedAttachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ResolvedAttachment {
    /// Wrap the attachment into a base64-encoded MIME part with an
    /// attachment disposition.
    ///
    /// Contents are encoded here, whatever their type: a part with
    /// an explicit transfer encoding is written as is.
    pub fn into_mime_part(self) -> MimePart<'static> {
        let (main, sub) = mime::split(&self.mime_type);
        let ctype = ContentType::new(format!("{main}/{sub}"));

        MimePart::new(ctype, encode_wrapped(&self.data))
            .transfer_encoding("base64")
            .attachment(self.filename)
    }
}

/// Encode the given bytes with the standard base64 alphabet, in lines
/// of at most [`BASE64_LINE_LEN`] characters separated by CRLF.
fn encode_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / 38);

    // base64 output is ascii, any index is a char boundary
    for start in (0..encoded.len()).step_by(BASE64_LINE_LEN) {
        if start > 0 {
            wrapped.push_str("\r\n");
        }
        let end = (start + BASE64_LINE_LEN).min(encoded.len());
        wrapped.push_str(&encoded[start..end]);
    }

    wrapped
}

/// The attachment resolver.
///
/// Decides, for each [`AttachmentSpec`], where its contents come
/// from. Path-based attachments are resolved and read against the
/// one sandbox root of the inner [`AttachmentsConfig`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttachmentResolver {
    config: AttachmentsConfig,
}

impl AttachmentResolver {
    pub fn new(config: AttachmentsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AttachmentsConfig {
        &self.config
    }

    /// Resolve the given attachment description.
    ///
    /// Only path-based attachments touch the file system.
    pub fn resolve(&self, spec: &AttachmentSpec) -> Result<ResolvedAttachment> {
        let filename = non_empty(&spec.filename);
        let mime_type = non_empty(&spec.mime_type);

        match (non_empty(&spec.content_base64), non_empty(&spec.path)) {
            (Some(_), Some(_)) => Err(Error::ConflictingSourceError),
            (None, Some(path)) => self.resolve_path(path, filename, mime_type),
            (Some(content), None) => Self::resolve_base64(content, filename, mime_type),
            (None, None) => Err(Error::MissingSourceError),
        }
    }

    fn resolve_path(
        &self,
        path: &str,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<ResolvedAttachment> {
        let base_dir = &self.config.base_dir;
        let path = path::resolve(path, base_dir);

        let filename = match filename {
            Some(filename) => filename.to_owned(),
            None => path
                .file_name()
                .and_then(OsStr::to_str)
                .filter(|name| !name.is_empty())
                .unwrap_or(NONAME)
                .to_owned(),
        };

        let mime_type = match mime_type {
            Some(mime_type) => mime_type.to_owned(),
            None => mime::guess(&filename),
        };

        let data = reader::read(&path, base_dir, self.config.max_size)?;

        Ok(ResolvedAttachment {
            filename,
            mime_type,
            data,
        })
    }

    fn resolve_base64(
        content: &str,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<ResolvedAttachment> {
        let filename = filename.ok_or(Error::MissingFilenameError)?.to_owned();

        let mime_type = match mime_type {
            Some(mime_type) => mime_type.to_owned(),
            None => mime::guess(Path::new(&filename)),
        };

        // wrapped payloads carry line breaks
        let content: String = content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let data = STANDARD
            .decode(content)
            .map_err(|err| Error::InvalidBase64Error(err, filename.clone()))?;
        debug!("decoded {} bytes of inline attachment {filename}", data.len());

        Ok(ResolvedAttachment {
            filename,
            mime_type,
            data,
        })
    }
}

fn non_empty(val: &Option<String>) -> Option<&str> {
    val.as_deref().filter(|val| !val.is_empty())
}
