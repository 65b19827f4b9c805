//! HTTP client for the remote agent-response endpoint.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::CompletionError;
use crate::types::{CompletionReply, CompletionRequest};

/// Where completions are served from.
#[derive(Debug, Clone)]
enum Endpoint {
    /// Base URL of the completion service.
    Url(String),
    /// No service configured — every call fails as unavailable.
    Disabled,
}

/// Client for the completion endpoint.
///
/// One POST per call, no retries: a failed completion is reported once and
/// the caller decides what happens to the pending placeholder.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    endpoint: Endpoint,
    http: Client,
    timeout: Duration,
}

impl CompletionClient {
    /// Create a client for the service at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            endpoint: Endpoint::Url(base_url.into()),
            http: Client::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Create a client with no endpoint. Every call returns
    /// [`CompletionError::Unavailable`].
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            endpoint: Endpoint::Disabled,
            http: Client::new(),
            timeout: Duration::ZERO,
        }
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.endpoint, Endpoint::Url(_))
    }

    /// Ask the endpoint for `agent_name`'s reply to `user_message`.
    pub async fn complete(
        &self,
        agent_name: &str,
        user_message: &str,
    ) -> Result<String, CompletionError> {
        let base = match &self.endpoint {
            Endpoint::Url(base) => base,
            Endpoint::Disabled => {
                return Err(CompletionError::Unavailable(
                    "no completion endpoint configured".to_string(),
                ));
            }
        };

        let url = format!("{base}/api/agent-response");
        let body = CompletionRequest {
            agent_name: agent_name.to_string(),
            user_message: user_message.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionError::Timeout(self.timeout.as_millis().try_into().unwrap_or(u64::MAX))
                } else {
                    CompletionError::from(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(agent = agent_name, status = %status, "completion endpoint returned an error");
            return Err(CompletionError::Status(status.as_u16()));
        }

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|err| CompletionError::MalformedBody(err.to_string()))?;

        debug!(agent = agent_name, chars = reply.response.len(), "completion received");
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_reports_unavailable() {
        let client = CompletionClient::disabled();
        assert!(!client.is_available());

        let err = client.complete("Sara", "hi").await.expect_err("disabled");
        assert!(matches!(err, CompletionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_unavailable() {
        // Nothing listens on this port.
        let client = CompletionClient::new("http://127.0.0.1:9", 500);
        assert!(client.is_available());

        let err = client.complete("Sara", "hi").await.expect_err("refused");
        assert!(matches!(
            err,
            CompletionError::Unavailable(_) | CompletionError::RequestFailed(_)
        ));
    }

    #[test]
    fn error_messages_name_the_failure() {
        assert!(CompletionError::Status(500).to_string().contains("500"));
        assert!(CompletionError::Timeout(10_000).to_string().contains("10000"));
    }
}
