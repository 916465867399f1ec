mod error;
pub mod guidance;
pub mod providers;
mod server;

pub use error::ProxyError;
pub use guidance::{canned_advice, match_topic};
pub use providers::{ChatAdvisor, ElevenLabsSpeech, GeminiSummarizer, SpeechAudio};
pub use server::{AppState, ProxyServer, create_router};
