//! Request and response bodies of the proxy routes
//!
//! Shared with the feed client so both sides agree on the wire format.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/summarize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
}

/// Successful summarization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Error body returned by the summarization route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `POST /api/advice`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub input: String,
    /// Overrides the configured default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Advice answer, live or canned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub success: bool,
    pub final_output: String,
    /// Set when `final_output` came from the built-in guidance table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body of `POST /api/speech`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: String,
    /// Overrides the configured default voice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

/// Error body of the speech route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}
