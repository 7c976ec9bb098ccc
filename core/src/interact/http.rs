use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpOutcome {
    /// The server answered. Error statuses land here too.
    Response {
        url: String,
        status: u16,
        reason: Option<&'static str>,
        /// At most `limit` characters, plus `...` when `truncated`.
        body: String,
        truncated: bool,
    },
    /// Transport or body decoding failed. Not retried.
    Failed { url: String, error: String },
}

impl HttpOutcome {
    pub fn url(&self) -> &str {
        match self {
            HttpOutcome::Response { url, .. } | HttpOutcome::Failed { url, .. } => url,
        }
    }

    pub fn status_line(&self) -> Option<String> {
        match self {
            HttpOutcome::Response { status, reason, .. } => {
                Some(format!("{status} {}", reason.unwrap_or_default()).trim_end().to_string())
            }
            HttpOutcome::Failed { .. } => None,
        }
    }
}

pub struct HttpProbe {
    client: Client,
    body_limit: usize,
}

impl HttpProbe {
    pub fn new(timeout: Duration, body_limit: usize) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { client, body_limit })
    }

    /// Issues one `GET http://addr/` and captures the status and the start of the body.
    pub async fn fetch(&self, addr: SocketAddr) -> HttpOutcome {
        let url = format!("http://{addr}/");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "HTTP request failed");
                return HttpOutcome::Failed {
                    url,
                    error: e.to_string(),
                };
            }
        };

        let status = response.status();
        info!(%url, status = %status, "got HTTP response");

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(%url, error = %e, "reading HTTP body failed");
                return HttpOutcome::Failed {
                    url,
                    error: format!("{status}: {e}"),
                };
            }
        };

        let (body, truncated) = truncate_body(&body, self.body_limit);
        HttpOutcome::Response {
            url,
            status: status.as_u16(),
            reason: status.canonical_reason(),
            body,
            truncated,
        }
    }
}

/// Keeps the first `limit` characters of `body`, appending a marker when cut.
///
/// Counts characters rather than bytes so multi-byte text is never split.
pub fn truncate_body(body: &str, limit: usize) -> (String, bool) {
    match body.char_indices().nth(limit) {
        Some((cut, _)) => (format!("{}{TRUNCATION_MARKER}", &body[..cut]), true),
        None => (body.to_string(), false),
    }
}
