//! # Send Gmail
//!
//! The operation behind the `send_gmail` tool: build one message
//! out of a [`SendRequest`], then send it.

use std::sync::Arc;

use compose::{MessageBuilder, SendRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result, SendMessage};

/// The outcome of a successful send.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SendGmailOutput {
    pub ok: bool,
    pub message_id: String,
}

#[derive(Clone)]
pub struct SendGmail {
    builder: MessageBuilder,
    sender: Arc<dyn SendMessage>,
}

impl SendGmail {
    pub fn new(builder: MessageBuilder, sender: impl SendMessage + 'static) -> Self {
        Self::from_arc(builder, Arc::new(sender))
    }

    pub fn from_arc(builder: MessageBuilder, sender: Arc<dyn SendMessage>) -> Self {
        Self { builder, sender }
    }

    pub fn builder(&self) -> &MessageBuilder {
        &self.builder
    }

    /// Build then send the given request.
    ///
    /// Nothing is sent when the message cannot be built, for example
    /// when one of the attachments cannot be resolved. Building reads
    /// attachment files, so it runs on the blocking thread pool.
    pub async fn send_gmail(&self, request: SendRequest) -> Result<SendGmailOutput> {
        let builder = self.builder.clone();
        let attachments = request.attachments.len();

        let msg = tokio::task::spawn_blocking(move || builder.build(&request))
            .await
            .map_err(Error::BuildMessageTaskError)??;

        let id = self.sender.send_message(&msg).await?;
        info!(%id, attachments, "gmail message sent");

        Ok(SendGmailOutput {
            ok: true,
            message_id: id.into(),
        })
    }
}
