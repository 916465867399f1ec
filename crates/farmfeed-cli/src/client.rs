//! HTTP client for the Farmfeed proxy routes

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::debug;

use farmfeed::api::{
    AdviceRequest, AdviceResponse, ErrorResponse, FailureResponse, SpeechRequest,
    SummarizeRequest, SummarizeResponse,
};

/// Errors talking to the proxy
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// The three proxy operations the feed depends on
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Summarize post content
    async fn summarize(&self, text: &str) -> Result<String, ClientError>;

    /// Ask for farming advice; `model` overrides the server default
    async fn advise(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<AdviceResponse, ClientError>;

    /// Fetch synthesized audio for `text`
    async fn speak(&self, text: &str, voice_id: Option<&str>) -> Result<Vec<u8>, ClientError>;
}

/// [`FeedApi`] backed by a running Farmfeed server
#[derive(Debug, Clone)]
pub struct HttpFeedApi {
    client: Client,
    base_url: String,
}

impl HttpFeedApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn route(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url, name)
    }

    async fn post_json<B, T>(&self, name: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.route(name);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(server_error(status.as_u16(), response.text().await.ok()));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

/// Pull the message out of either error body shape
fn server_error(status: u16, body: Option<String>) -> ClientError {
    let body = body.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .or_else(|_| serde_json::from_str::<FailureResponse>(&body).map(|e| e.error))
        .unwrap_or(body);
    ClientError::Server { status, message }
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn summarize(&self, text: &str) -> Result<String, ClientError> {
        let request = SummarizeRequest {
            text: text.to_string(),
        };
        let response: SummarizeResponse = self.post_json("summarize", &request).await?;

        if response.summary.trim().is_empty() {
            return Err(ClientError::InvalidResponse("empty summary".to_string()));
        }
        Ok(response.summary)
    }

    async fn advise(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<AdviceResponse, ClientError> {
        let request = AdviceRequest {
            input: prompt.to_string(),
            model: model.map(str::to_string),
        };
        self.post_json("advice", &request).await
    }

    async fn speak(&self, text: &str, voice_id: Option<&str>) -> Result<Vec<u8>, ClientError> {
        let request = SpeechRequest {
            text: text.to_string(),
            voice_id: voice_id.map(str::to_string),
        };
        let url = self.route("speech");
        debug!("POST {}", url);

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(server_error(status.as_u16(), response.text().await.ok()));
        }

        let is_audio = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("audio/"));
        if !is_audio {
            return Err(ClientError::InvalidResponse(
                "speech route did not return audio".to_string(),
            ));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ClientError::InvalidResponse("empty audio".to_string()));
        }
        Ok(audio.to_vec())
    }
}
