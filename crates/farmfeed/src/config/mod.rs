use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{FarmfeedError, Result};

/// Main configuration structure for Farmfeed
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Summarization provider configuration
    #[serde(default)]
    pub summarize: SummarizeConfig,
    /// Advice provider configuration
    #[serde(default)]
    pub advice: AdviceConfig,
    /// Text-to-speech provider configuration
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FarmfeedError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from an explicit path, or from the first default
    /// location that exists, falling back to built-in defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::read_file(path);
        }

        for path in Self::default_paths().iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::read_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn default_paths() -> [Option<PathBuf>; 3] {
        [
            dirs::home_dir().map(|h| h.join(".farmfeed").join("config.toml")),
            dirs::config_dir().map(|c| c.join("farmfeed").join("config.toml")),
            Some(PathBuf::from("farmfeed.toml")),
        ]
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FarmfeedError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides that come from the process environment rather than the file.
    ///
    /// Currently this is only the summarization model name.
    pub fn apply_env_overrides(&mut self) {
        if let Some(model) = read_env(&self.summarize.model_env) {
            tracing::debug!("Summarization model overridden from {}", self.summarize.model_env);
            self.summarize.model = model;
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:3000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Outbound request timeout in seconds (unset = no explicit timeout)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            timeout_secs: None,
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

/// Summarization provider (Gemini `generateContent`) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeConfig {
    /// API base URL
    #[serde(default = "default_summarize_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_summarize_api_key_env")]
    pub api_key_env: String,
    /// Model identifier
    #[serde(default = "default_summarize_model")]
    pub model: String,
    /// Environment variable that overrides `model` when set
    #[serde(default = "default_summarize_model_env")]
    pub model_env: String,
    /// Prompt template, `{text}` is replaced with the post content
    #[serde(default = "default_summarize_prompt")]
    pub prompt: String,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            api_url: default_summarize_api_url(),
            api_key_env: default_summarize_api_key_env(),
            model: default_summarize_model(),
            model_env: default_summarize_model_env(),
            prompt: default_summarize_prompt(),
        }
    }
}

fn default_summarize_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_summarize_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_summarize_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_summarize_model_env() -> String {
    "GEMINI_MODEL".to_string()
}

fn default_summarize_prompt() -> String {
    "Summarize this farm community post in one or two short sentences:\n\n{text}".to_string()
}

/// Advice provider (OpenAI-compatible chat completions) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdviceConfig {
    /// API base URL
    #[serde(default = "default_advice_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_advice_api_key_env")]
    pub api_key_env: String,
    /// Default model, used when a request does not name one
    #[serde(default = "default_advice_model")]
    pub model: String,
    /// System prompt sent ahead of the farmer's question
    #[serde(default = "default_advice_system_prompt")]
    pub system_prompt: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            api_url: default_advice_api_url(),
            api_key_env: default_advice_api_key_env(),
            model: default_advice_model(),
            system_prompt: default_advice_system_prompt(),
        }
    }
}

fn default_advice_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_advice_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_advice_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_advice_system_prompt() -> String {
    "You are an experienced agronomist helping small farmers. \
     Answer in a few practical sentences."
        .to_string()
}

/// Text-to-speech provider (ElevenLabs) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// API base URL
    #[serde(default = "default_speech_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_speech_api_key_env")]
    pub api_key_env: String,
    /// Voice used when a request does not name one
    #[serde(default = "default_speech_voice_id")]
    pub voice_id: String,
    /// Synthesis model identifier
    #[serde(default = "default_speech_model_id")]
    pub model_id: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_url: default_speech_api_url(),
            api_key_env: default_speech_api_key_env(),
            voice_id: default_speech_voice_id(),
            model_id: default_speech_model_id(),
        }
    }
}

fn default_speech_api_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_speech_api_key_env() -> String {
    "ELEVENLABS_API_KEY".to_string()
}

fn default_speech_voice_id() -> String {
    "21m00Tcm4TlvDq8iAZpv".to_string()
}

fn default_speech_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

/// Provider API keys, resolved once and handed to the router
///
/// `None` means the provider is not configured. That is an expected state
/// for advice and speech, which fall back instead of failing.
#[derive(Clone, Default)]
pub struct Credentials {
    pub summarize: Option<String>,
    pub advice: Option<String>,
    pub speech: Option<String>,
}

impl Credentials {
    /// Read each provider key from the environment variable named in config
    pub fn from_env(config: &Config) -> Self {
        Self {
            summarize: read_env(&config.summarize.api_key_env),
            advice: read_env(&config.advice.api_key_env),
            speech: read_env(&config.speech.api_key_env),
        }
    }

    /// Credentials with no provider configured
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = |key: &Option<String>| if key.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("summarize", &state(&self.summarize))
            .field("advice", &state(&self.advice))
            .field("speech", &state(&self.speech))
            .finish()
    }
}

/// Blank values count as unset
fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert!(config.server.timeout_secs.is_none());
        assert_eq!(config.summarize.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.summarize.model, "gemini-1.5-flash");
        assert_eq!(config.summarize.model_env, "GEMINI_MODEL");
        assert!(config.summarize.prompt.contains("{text}"));
        assert_eq!(config.advice.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.advice.model, "gpt-4o-mini");
        assert_eq!(config.speech.api_key_env, "ELEVENLABS_API_KEY");
        assert_eq!(config.speech.voice_id, "21m00Tcm4TlvDq8iAZpv");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[server]
listen_addr = "0.0.0.0:8080"
timeout_secs = 20

[summarize]
api_url = "http://localhost:9000/v1beta"
api_key_env = "MY_GEMINI_KEY"
model = "gemini-2.0-flash"

[advice]
model = "gpt-4o"

[speech]
voice_id = "custom-voice"
model_id = "eleven_turbo_v2"
"#;

        let config = Config::from_toml_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.server.timeout_secs, Some(20));
        assert_eq!(config.summarize.api_url, "http://localhost:9000/v1beta");
        assert_eq!(config.summarize.api_key_env, "MY_GEMINI_KEY");
        assert_eq!(config.summarize.model, "gemini-2.0-flash");
        assert_eq!(config.advice.model, "gpt-4o");
        assert_eq!(config.advice.api_url, "https://api.openai.com/v1");
        assert_eq!(config.speech.voice_id, "custom-voice");
        assert_eq!(config.speech.model_id, "eleven_turbo_v2");
    }

    #[test]
    fn test_toml_partial_deserialization() {
        let toml_str = r#"
[speech]
voice_id = "abc"
"#;

        let config = Config::from_toml_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.summarize.model, "gemini-1.5-flash");
        assert_eq!(config.speech.voice_id, "abc");
        assert_eq!(config.speech.api_key_env, "ELEVENLABS_API_KEY");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[server\nlisten_addr = 1").unwrap_err();
        assert!(matches!(err, FarmfeedError::Config(_)));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten_addr = \"127.0.0.1:4100\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:4100");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_credentials_from_env_ignores_blank_values() {
        let mut config = Config::default();
        config.summarize.api_key_env = "FARMFEED_TEST_SUMMARIZE_KEY".to_string();
        config.advice.api_key_env = "FARMFEED_TEST_ADVICE_KEY".to_string();
        config.speech.api_key_env = "FARMFEED_TEST_SPEECH_KEY".to_string();

        unsafe {
            env::set_var("FARMFEED_TEST_SUMMARIZE_KEY", "gem-key");
            env::set_var("FARMFEED_TEST_ADVICE_KEY", "   ");
            env::remove_var("FARMFEED_TEST_SPEECH_KEY");
        }

        let credentials = Credentials::from_env(&config);
        assert_eq!(credentials.summarize.as_deref(), Some("gem-key"));
        assert!(credentials.advice.is_none());
        assert!(credentials.speech.is_none());
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let credentials = Credentials {
            summarize: Some("super-secret".to_string()),
            advice: None,
            speech: None,
        };
        let printed = format!("{credentials:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("set"));
    }

    #[test]
    fn test_model_env_override() {
        let mut config = Config::default();
        config.summarize.model_env = "FARMFEED_TEST_GEMINI_MODEL".to_string();

        unsafe { env::set_var("FARMFEED_TEST_GEMINI_MODEL", "gemini-2.5-pro") };
        config.apply_env_overrides();
        assert_eq!(config.summarize.model, "gemini-2.5-pro");

        unsafe { env::remove_var("FARMFEED_TEST_GEMINI_MODEL") };
        let mut untouched = Config::default();
        untouched.summarize.model_env = "FARMFEED_TEST_GEMINI_MODEL".to_string();
        untouched.apply_env_overrides();
        assert_eq!(untouched.summarize.model, "gemini-1.5-flash");
    }
}
