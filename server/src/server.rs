//! The MCP server and its single tool.

use compose::SendRequest;
use gmail::SendGmail;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData, Implementation, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ServerHandler,
};
use tracing::warn;

use crate::params::SendGmailParams;

pub const SERVER_NAME: &str = "gmail-mcp-server";

#[derive(Clone)]
pub struct GmailServer {
    op: SendGmail,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GmailServer {
    pub fn new(op: SendGmail) -> Self {
        Self {
            op,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "send_gmail",
        description = "Send an email through Gmail. The body is plain text or HTML. Attachments are given either by path (relative to the shared attachments directory, or absolute inside it) or by filename plus base64 content."
    )]
    pub async fn send_gmail(
        &self,
        Parameters(params): Parameters<SendGmailParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let output = match SendRequest::try_from(params) {
            Ok(request) => self.op.send_gmail(request).await,
            Err(err) => Err(err.into()),
        };

        match output {
            Ok(output) => match serde_json::to_value(&output) {
                Ok(output) => Ok(CallToolResult::structured(output)),
                Err(err) => Err(ErrorData::internal_error(err.to_string(), None)),
            },
            Err(err) => {
                let chain = format!("{:#}", anyhow::Error::new(err));
                warn!("cannot send gmail message: {chain}");
                Ok(CallToolResult::error(vec![Content::text(chain)]))
            }
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for GmailServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Default::default()
            },
            instructions: Some(
                "Send emails through Gmail with the send_gmail tool. Path attachments must live inside the attachments base directory (ATTACHMENTS_BASE_DIR, default /shared).".to_owned(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
