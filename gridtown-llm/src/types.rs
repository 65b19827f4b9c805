//! Wire types for the completion endpoint.

use serde::{Deserialize, Serialize};

/// Request body for the completion endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// The agent persona to answer as.
    pub agent_name: String,
    /// The raw user message.
    pub user_message: String,
}

/// Successful response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionReply {
    /// The agent's reply text.
    pub response: String,
}
