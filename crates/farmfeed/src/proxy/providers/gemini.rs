//! Summarization via the Gemini `generateContent` API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::SummarizeConfig;
use crate::proxy::error::ProxyError;

use super::endpoint;

/// Summarizes post text with a Gemini model
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    client: Client,
    config: SummarizeConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiSummarizer {
    pub fn new(client: Client, config: SummarizeConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Summarize `text`, returning the first candidate's text
    pub async fn summarize(&self, text: &str) -> Result<String, ProxyError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(self.config.prompt.replace("{text}", text)),
                }],
            }],
        };

        let method = format!("{}:generateContent", self.config.model);
        let url = endpoint(&self.config.api_url, &["models", method.as_str()])?;
        debug!("Calling summarization API at: {}", url);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::from_upstream(response).await);
        }

        let raw: Value = response.json().await?;
        debug!("Summarization response: {}", raw);

        let parsed: GenerateContentResponse = serde_json::from_value(raw)
            .map_err(|e| ProxyError::InvalidResponse(format!("Unexpected payload: {e}")))?;

        let summary = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if summary.is_empty() {
            return Err(ProxyError::InvalidResponse(
                "No summary text in response".to_string(),
            ));
        }

        Ok(summary)
    }
}
