//! Clients for the external AI providers
//!
//! One client per provider. Each is built once at startup when its
//! credential is present and performs a single attempt per call.

mod chat;
mod elevenlabs;
mod gemini;

pub use chat::ChatAdvisor;
pub use elevenlabs::{ElevenLabsSpeech, SpeechAudio};
pub use gemini::GeminiSummarizer;

use url::Url;

use super::error::ProxyError;

/// Append path segments to a provider base URL
///
/// Segments are percent-encoded, so caller-supplied values such as a voice
/// id cannot escape their position in the path.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ProxyError> {
    let mut url = Url::parse(base)
        .map_err(|e| ProxyError::Config(format!("Invalid provider URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ProxyError::Config(format!("Provider URL '{base}' cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
