//! MCP server exposing one `send_gmail` tool.
//!
//! Attachments given by path are read from the attachments base
//! directory (`ATTACHMENTS_BASE_DIR`, default `/shared`), up to
//! `MAX_ATTACHMENT_MB` megabytes each. Gmail credentials come from
//! `GMAIL_TOKEN_FILE` and `GMAIL_CREDENTIALS_FILE`.

mod params;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use compose::{AttachmentsConfig, MessageBuilder};
use gmail::{GmailSender, SendGmail, TokenFileConfig, TokenFileCredentials};
use rmcp::{
    transport::{
        stdio,
        streamable_http_server::{session::local::LocalSessionManager, StreamableHttpService},
    },
    ServiceExt,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::server::GmailServer;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
enum Transport {
    /// MCP streamable HTTP
    #[default]
    Http,
    Stdio,
}

#[derive(Debug, Parser)]
#[command(name = "gmail-mcp-server", version, about)]
struct Cli {
    #[arg(short, long, value_enum, default_value_t, env = "MCP_TRANSPORT")]
    transport: Transport,

    #[arg(short, long, default_value_t = 3001, env = "MCP_PORT")]
    port: u16,

    #[arg(long, default_value = "0.0.0.0", env = "MCP_HOST")]
    host: String,

    /// Mount point of the streamable HTTP endpoint
    #[arg(long, default_value = "/mcp", env = "MCP_PATH")]
    path: String,

    /// Base URL of the Gmail REST API
    #[arg(long, env = "GMAIL_API_URL", default_value = gmail::sender::GMAIL_API_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();

    let attachments = AttachmentsConfig::from_env()?;
    info!(
        base_dir = %attachments.base_dir.display(),
        max_size = attachments.max_size,
        "attachments configured"
    );

    let credentials = TokenFileCredentials::new(TokenFileConfig::from_env());
    let sender = GmailSender::new(credentials).with_api_url(&cli.api_url);
    let op = SendGmail::new(MessageBuilder::new(attachments), sender);
    let server = GmailServer::new(op);

    match cli.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, &cli.host, cli.port, &cli.path).await,
    }
}

/// Logs go to stderr, stdout belongs to the stdio transport.
fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

async fn serve_stdio(server: GmailServer) -> Result<()> {
    info!("serving mcp over stdio");

    let service = server
        .serve(stdio())
        .await
        .context("cannot start mcp server over stdio")?;
    service.waiting().await?;

    Ok(())
}

async fn serve_http(server: GmailServer, host: &str, port: u16, path: &str) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        Default::default(),
    );

    let path = format!("/{}", path.trim_matches('/'));
    let router = if path == "/" {
        axum::Router::new().fallback_service(service)
    } else {
        axum::Router::new().nest_service(&path, service)
    };

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("cannot bind mcp server on {host}:{port}"))?;
    info!("serving mcp over streamable http at http://{host}:{port}{path}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("cannot serve mcp over http")?;

    Ok(())
}
