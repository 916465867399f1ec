//! Text-to-speech via the ElevenLabs API

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use crate::config::SpeechConfig;
use crate::proxy::error::ProxyError;

use super::endpoint;

const DEFAULT_AUDIO_TYPE: &str = "audio/mpeg";

/// Synthesizes speech with an ElevenLabs voice
#[derive(Debug, Clone)]
pub struct ElevenLabsSpeech {
    client: Client,
    config: SpeechConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Synthesized audio clip
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub content_type: String,
    pub bytes: Bytes,
}

impl ElevenLabsSpeech {
    pub fn new(client: Client, config: SpeechConfig, api_key: String) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    /// Synthesize `text` with `voice_id`, or the configured voice
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<SpeechAudio, ProxyError> {
        let voice_id = voice_id.unwrap_or(&self.config.voice_id);
        let request = TextToSpeechRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        let url = endpoint(&self.config.api_url, &["text-to-speech", voice_id])?;
        debug!("Calling speech API at: {}", url);

        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, DEFAULT_AUDIO_TYPE)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::from_upstream(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("audio/"))
            .unwrap_or(DEFAULT_AUDIO_TYPE)
            .to_string();

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProxyError::InvalidResponse(
                "Speech provider returned no audio".to_string(),
            ));
        }

        debug!("Received {} bytes of {}", bytes.len(), content_type);
        Ok(SpeechAudio {
            content_type,
            bytes,
        })
    }
}
