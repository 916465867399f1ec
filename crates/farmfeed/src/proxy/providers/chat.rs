//! Farming advice via an OpenAI-compatible chat completions API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdviceConfig;
use crate::proxy::error::ProxyError;

use super::endpoint;

/// Answers farming questions with a chat model
#[derive(Debug, Clone)]
pub struct ChatAdvisor {
    client: Client,
    config: AdviceConfig,
    api_key: String,
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatAdvisor {
    pub fn new(client: Client, config: AdviceConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Model used when the caller does not pick one
    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    /// Ask the provider for advice on `prompt`
    pub async fn advise(&self, prompt: &str, model: Option<&str>) -> Result<String, ProxyError> {
        let request = ChatCompletionRequest {
            model: model.unwrap_or(&self.config.model),
            messages: vec![
                Message {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let url = endpoint(&self.config.api_url, &["chat", "completions"])?;
        debug!("Calling advice API at: {} (model {})", url, request.model);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::from_upstream(response).await);
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProxyError::InvalidResponse("Empty advice response".to_string()))
    }
}
