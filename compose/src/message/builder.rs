use mail_builder::{headers::raw::Raw, mime::MimePart, MessageBuilder as MimeMessageBuilder};
use tracing::debug;

use crate::{AttachmentResolver, AttachmentsConfig, Error, Result};

use super::{EncodedMessage, SendRequest};

/// The message builder.
///
/// Assembles a `multipart/mixed` message made of the body part
/// followed by one part per attachment, in request order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MessageBuilder {
    resolver: AttachmentResolver,
}

impl MessageBuilder {
    pub fn new(config: AttachmentsConfig) -> Self {
        Self::from_resolver(AttachmentResolver::new(config))
    }

    pub fn from_resolver(resolver: AttachmentResolver) -> Self {
        Self { resolver }
    }

    /// Build the given request into its transport-ready form.
    ///
    /// Fails on the first attachment that cannot be resolved, in
    /// which case nothing is built.
    pub fn build(&self, request: &SendRequest) -> Result<EncodedMessage> {
        let mime_msg = self.build_mime(request)?;
        Ok(EncodedMessage::encode(mime_msg))
    }

    /// Build the given request into a raw MIME message.
    pub fn build_mime(&self, request: &SendRequest) -> Result<Vec<u8>> {
        ensure_single_line("To", &request.to)?;
        ensure_single_line("Subject", &request.subject)?;

        let mut parts = Vec::with_capacity(request.attachments.len() + 1);
        parts.push(MimePart::new(
            request.body_format.mime_type(),
            request.body.as_str(),
        ));

        for (index, spec) in request.attachments.iter().enumerate() {
            let attachment = self.resolver.resolve(spec)?;
            debug!(
                index,
                filename = %attachment.filename,
                mime_type = %attachment.mime_type,
                size = attachment.data.len(),
                "attaching"
            );
            parts.push(attachment.into_mime_part());
        }

        MimeMessageBuilder::new()
            .header("To", Raw::new(request.to.as_str()))
            .subject(request.subject.as_str())
            .body(MimePart::new("multipart/mixed", parts))
            .write_to_vec()
            .map_err(Error::BuildMessageError)
    }
}

fn ensure_single_line(header: &'static str, val: &str) -> Result<()> {
    if val.contains(['\r', '\n']) {
        Err(Error::InvalidHeaderError(header))
    } else {
        Ok(())
    }
}
