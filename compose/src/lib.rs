#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
//! Rust library to compose outgoing MIME messages.
//!
//! The library turns a [`SendRequest`] (recipient, subject, body and
//! an ordered list of attachments) into an [`EncodedMessage`]: the
//! URL-safe base64 form of the full MIME message, ready to be handed
//! to a mail provider.
//!
//! Attachments are given either inline, as base64 payloads, or as
//! paths. Paths are resolved under a sandbox root and read only if
//! they stay inside it and fit the configured size limit, see
//! [`AttachmentsConfig`].
//!
//! ```rust,no_run
//! use compose::{AttachmentSpec, AttachmentsConfig, BodyFormat, MessageBuilder, SendRequest};
//!
//! let config = AttachmentsConfig::from_env()?;
//! let request = SendRequest::new("bob@localhost", "Report", "<b>See attached</b>")
//!     .with_body_format(BodyFormat::Html)
//!     .with_attachment(AttachmentSpec::from_path("output/report.pdf"));
//!
//! let encoded = MessageBuilder::new(config).build(&request)?;
//! println!("{encoded}");
//! # Ok::<(), compose::Error>(())
//! ```

pub mod attachment;
pub mod config;
mod error;
pub mod message;

#[doc(inline)]
pub use crate::{
    attachment::{AttachmentResolver, AttachmentSpec, ResolvedAttachment},
    config::AttachmentsConfig,
    error::{Error, Result},
    message::{BodyFormat, EncodedMessage, MessageBuilder, SendRequest},
};
