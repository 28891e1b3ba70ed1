#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
//! Rust library to send messages through the Gmail API.
//!
//! The library glues three pieces together:
//!
//! - a [`CredentialProvider`], giving OAuth 2.0 access tokens (see
//!   [`TokenFileCredentials`] for the usual installed-app flow),
//! - a [`SendMessage`] implementation posting encoded messages to the
//!   Gmail REST API ([`GmailSender`]),
//! - the [`SendGmail`] operation, which builds the message with
//!   [`compose`] then hands it to the sender.

pub mod credentials;
mod error;
pub mod send;
pub mod sender;

pub use compose;

#[doc(inline)]
pub use crate::{
    credentials::{
        token_file::{TokenFileConfig, TokenFileCredentials},
        CredentialProvider, StaticCredentials,
    },
    error::{Error, Result},
    send::{SendGmail, SendGmailOutput},
    sender::{GmailSender, MessageId, SendMessage},
};
