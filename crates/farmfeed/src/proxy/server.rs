//! HTTP server hosting the three proxy routes
//!
//! - `POST /api/summarize` fails with a structured error when it cannot summarize
//! - `POST /api/advice` never fails, degrading to built-in guidance
//! - `POST /api/speech` returns audio, or a structured error the client
//!   answers with on-device speech

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::api::{
    AdviceRequest, AdviceResponse, ErrorResponse, FailureResponse, SpeechRequest,
    SummarizeRequest, SummarizeResponse,
};
use crate::config::{Config, Credentials};
use crate::error::{FarmfeedError, Result};

use super::error::ProxyError;
use super::guidance::{
    self, NOTE_EMPTY_PROMPT, NOTE_NOT_CONFIGURED, NOTE_UNREADABLE_REQUEST, NOTE_UPSTREAM_FAILED,
};
use super::providers::{ChatAdvisor, ElevenLabsSpeech, GeminiSummarizer, SpeechAudio};

/// Shared application state for all handlers
///
/// A provider client is present only when its credential was configured.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub summarizer: Option<GeminiSummarizer>,
    pub advisor: Option<ChatAdvisor>,
    pub speech: Option<ElevenLabsSpeech>,
}

impl AppState {
    /// Build the provider clients from resolved configuration
    pub fn new(config: Config, credentials: Credentials) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.server.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FarmfeedError::Proxy(format!("Failed to create HTTP client: {e}")))?;

        let summarizer = credentials
            .summarize
            .map(|key| GeminiSummarizer::new(client.clone(), config.summarize.clone(), key));
        let advisor = credentials
            .advice
            .map(|key| ChatAdvisor::new(client.clone(), config.advice.clone(), key));
        let speech = credentials
            .speech
            .map(|key| ElevenLabsSpeech::new(client.clone(), config.speech.clone(), key));

        Ok(Self {
            config,
            summarizer,
            advisor,
            speech,
        })
    }
}

/// The proxy server
pub struct ProxyServer {
    config: Config,
    credentials: Credentials,
}

impl ProxyServer {
    pub fn new(config: Config, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// Start the server and listen for requests until shutdown
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .server
            .listen_addr
            .parse()
            .map_err(|e| FarmfeedError::Config(format!("Invalid listen address: {e}")))?;

        let state = AppState::new(self.config, self.credentials)?;
        log_provider("Summarization", state.summarizer.is_some(), "requests will fail");
        log_provider("Advice", state.advisor.is_some(), "built-in guidance only");
        log_provider("Speech", state.speech.is_some(), "clients will speak locally");

        let app = create_router(Arc::new(state));

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FarmfeedError::Proxy(format!("Failed to bind to {addr}: {e}")))?;
        tracing::info!("Starting proxy server on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| FarmfeedError::Proxy(format!("Server error: {e}")))?;

        tracing::info!("Proxy server shut down gracefully");
        Ok(())
    }
}

fn log_provider(name: &str, configured: bool, consequence: &str) {
    if configured {
        tracing::info!("{name} provider: configured");
    } else {
        tracing::warn!("{name} provider: no API key ({consequence})");
    }
}

/// Create the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/advice", post(advice_handler))
        .route("/api/speech", post(speech_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint - returns JSON status
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    match summarize(&state, payload).await {
        Ok(summary) => Json(SummarizeResponse { summary }).into_response(),
        Err(e) => {
            warn!(error_type = e.category(), "Summarization failed: {e}");
            let status = match e {
                ProxyError::Request(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

async fn summarize(
    state: &AppState,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> std::result::Result<String, ProxyError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ProxyError::Request("text is required".to_string()));
    }

    let summarizer = state.summarizer.as_ref().ok_or_else(|| {
        ProxyError::Config(format!(
            "Summarization API key not configured (set {})",
            state.config.summarize.api_key_env
        ))
    })?;

    summarizer.summarize(text).await
}

async fn advice_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AdviceRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let e = invalid_body(rejection);
            warn!(
                error_type = e.category(),
                "Unreadable advice request, using built-in guidance: {e}"
            );
            return Json(canned("", NOTE_UNREADABLE_REQUEST)).into_response();
        }
    };

    Json(advise(&state, &request).await).into_response()
}

async fn advise(state: &AppState, request: &AdviceRequest) -> AdviceResponse {
    let prompt = request.input.trim();
    if prompt.is_empty() {
        return canned(prompt, NOTE_EMPTY_PROMPT);
    }

    let Some(advisor) = state.advisor.as_ref() else {
        debug!("No advice API key configured, using built-in guidance");
        return canned(prompt, NOTE_NOT_CONFIGURED);
    };

    let model = request
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    debug!("Asking advice model {}", model.unwrap_or(advisor.default_model()));

    match advisor.advise(prompt, model).await {
        Ok(final_output) => AdviceResponse {
            success: true,
            final_output,
            note: None,
        },
        Err(e) => {
            warn!(error_type = e.category(), "Advice provider failed, using built-in guidance: {e}");
            canned(prompt, NOTE_UPSTREAM_FAILED)
        }
    }
}

fn canned(prompt: &str, note: &str) -> AdviceResponse {
    AdviceResponse {
        success: true,
        final_output: guidance::canned_advice(prompt).to_string(),
        note: Some(note.to_string()),
    }
}

async fn speech_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SpeechRequest>, JsonRejection>,
) -> Response {
    match synthesize(&state, payload).await {
        Ok(audio) => ([(header::CONTENT_TYPE, audio.content_type)], audio.bytes).into_response(),
        Err(e) => {
            warn!(error_type = e.category(), "Speech synthesis failed: {e}");
            failure(e.status(), &e)
        }
    }
}

async fn synthesize(
    state: &AppState,
    payload: std::result::Result<Json<SpeechRequest>, JsonRejection>,
) -> std::result::Result<SpeechAudio, ProxyError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ProxyError::Request("text is required".to_string()));
    }

    let speech = state.speech.as_ref().ok_or_else(|| {
        ProxyError::Config(format!(
            "Speech API key not configured (set {})",
            state.config.speech.api_key_env
        ))
    })?;

    let voice_id = request
        .voice_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    speech.synthesize(text, voice_id).await
}

fn invalid_body(rejection: JsonRejection) -> ProxyError {
    ProxyError::Request(format!("Invalid request body: {}", rejection.body_text()))
}

fn failure(status: StatusCode, error: &ProxyError) -> Response {
    let body = FailureResponse {
        success: false,
        error: error.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
