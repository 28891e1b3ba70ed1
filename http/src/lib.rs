#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
//! High-level, asynchronous API for [`ureq`].
//!
//! The [`Client`] wraps a blocking `ureq` agent and runs every request
//! on the blocking thread pool of [`tokio`], so that async code can
//! drive it without stalling the runtime.

mod error;

use std::time::{Duration, Instant};

use tracing::debug;

pub use ureq;
use ureq::{
    config::Config,
    http::Response,
    tls::{RootCerts, TlsConfig, TlsProvider},
    Agent, Body,
};

#[doc(inline)]
pub use crate::error::{Error, Result};

/// The default global timeout of a request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The HTTP client structure.
///
/// This structure wraps a HTTP agent, which is used by the
/// [`Client::send`] function.
#[derive(Clone, Debug)]
pub struct Client {
    /// The HTTP agent used to perform calls.
    agent: Agent,
}

impl Client {
    /// Creates a new HTTP client with sane defaults.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a new HTTP client with the given global timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let tls = TlsConfig::builder()
            .root_certs(RootCerts::PlatformVerifier)
            .provider(TlsProvider::Rustls);

        let config = Config::builder()
            .tls_config(tls.build())
            .timeout_global(Some(timeout))
            .build();
        let agent = config.new_agent();

        Self { agent }
    }

    /// Sends a request.
    ///
    /// This function takes a callback that tells how the request
    /// looks like. It takes a reference to the inner HTTP agent as
    /// parameter.
    pub async fn send(
        &self,
        f: impl FnOnce(&Agent) -> std::result::Result<Response<Body>, ureq::Error> + Send + 'static,
    ) -> Result<Response<Body>> {
        let agent = self.agent.clone();
        let start = Instant::now();

        let res = tokio::task::spawn_blocking(move || f(&agent))
            .await?
            .map_err(Error::SendRequestError)?;

        debug!(status = %res.status(), elapsed = ?start.elapsed(), "http response received");
        Ok(res)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread,
    };

    use super::{Client, Error};

    /// Serve one connection with the given status line and body.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            let res = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(res.as_bytes()).unwrap();
        });

        format!("http://{addr}/")
    }

    #[test_log::test(tokio::test)]
    async fn send_get_request() {
        let url = serve_once("200 OK", "hello");

        let res = Client::new()
            .send(move |agent| agent.get(&url).call())
            .await
            .unwrap();

        assert_eq!(res.status(), 200);
        assert_eq!(res.into_body().read_to_string().unwrap(), "hello");
    }

    #[test_log::test(tokio::test)]
    async fn send_request_with_error_status() {
        let url = serve_once("404 Not Found", "nope");

        let err = Client::new()
            .send(move |agent| agent.get(&url).call())
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::SendRequestError(ureq::Error::StatusCode(404))),
            "{err:?}"
        );
    }
}
