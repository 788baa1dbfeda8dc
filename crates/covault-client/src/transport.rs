//! The network seam
//!
//! The orchestrator is the sole caller of [`Transport`]. The production
//! implementation wraps [`reqwest::Client`]; tests inject an in-memory
//! scripted transport. Timeouts and cancellation live here, not in the
//! protocol layer, and nothing retries.

use async_trait::async_trait;
use covault_types::{Error, Result};
use serde::Deserialize;

/// Authentication headers attached to a request. Both absent for bootstrap
/// calls issued before a copayer identity exists.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    /// `x-identity`: the caller's copayer id
    pub identity: Option<String>,
    /// `x-signature`: hex signature over the canonical request string
    pub signature: Option<String>,
}

/// Executes one authenticated network call. Status 200 means success; any
/// other status carries an error body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: &str,
        url: &str,
        headers: RequestHeaders,
        body: Option<String>,
    ) -> Result<(u16, String)>;
}

/// Production transport over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: &str,
        url: &str,
        headers: RequestHeaders,
        body: Option<String>,
    ) -> Result<(u16, String)> {
        let method: reqwest::Method = method
            .parse()
            .map_err(|_| Error::Transport(format!("invalid method: {method}")))?;

        let mut req = self.client.request(method, url);
        if let Some(identity) = headers.identity {
            req = req.header("x-identity", identity);
        }
        if let Some(signature) = headers.signature {
            req = req.header("x-signature", signature);
        }
        if let Some(body) = body {
            req = req
                .header("content-type", "application/json")
                .body(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok((status, text))
    }
}

#[derive(Deserialize)]
struct ServerErrorBody {
    code: String,
    message: String,
}

/// Turn a non-200 body into the structured server error, or a generic
/// wrapper when the body is unstructured.
pub fn parse_error_body(status: u16, body: &str) -> Error {
    match serde_json::from_str::<ServerErrorBody>(body) {
        Ok(parsed) => Error::Server {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => Error::Server {
            code: format!("HTTP{status}"),
            message: if body.is_empty() {
                "unexpected server response".to_string()
            } else {
                body.to_string()
            },
        },
    }
}
