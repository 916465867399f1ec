//! Audio playback and on-device speech

use std::io::{Cursor, ErrorKind};
use std::process::Stdio;

use async_trait::async_trait;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Could not decode audio: {0}")]
    Decode(String),
    #[error("No audio output available: {0}")]
    NoOutput(String),
    #[error("Playback task failed: {0}")]
    Task(String),
    #[error("Empty command")]
    EmptyCommand,
    #[error("{program} exited with {status}")]
    Command { program: String, status: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output side of the Listen action
#[async_trait]
pub trait Playback: Send + Sync {
    /// Play an encoded audio clip to completion
    async fn play_audio(&self, audio: &[u8]) -> Result<(), PlaybackError>;

    /// Speak `text` with the on-device synthesizer
    async fn speak_locally(&self, text: &str) -> Result<(), PlaybackError>;
}

/// Synthesizers tried in order when none is configured. Each reads text from stdin.
const SYNTHESIZER_CANDIDATES: &[&str] = &["espeak --stdin", "say -f -"];

/// [`Playback`] on the default audio device
///
/// Clips are decoded and played in-process with rodio. Local speech pipes
/// the text into a synthesizer command; without one it prints the text.
#[derive(Debug, Clone, Default)]
pub struct SystemPlayback {
    synthesizer: Option<String>,
}

impl SystemPlayback {
    /// `synthesizer` must read the text to speak from stdin
    pub fn new(synthesizer: Option<String>) -> Self {
        Self { synthesizer }
    }
}

fn play_blocking(audio: Vec<u8>) -> Result<(), PlaybackError> {
    let source =
        Decoder::new(Cursor::new(audio)).map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let mut stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| PlaybackError::NoOutput(e.to_string()))?;
    stream.log_on_drop(false);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

/// Run `command_line` with `text` on stdin. The text never reaches argv.
async fn pipe_text(command_line: &str, text: &str) -> Result<(), PlaybackError> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or(PlaybackError::EmptyCommand)?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()).await {
            // the program may exit without reading; its status says how it went
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }
    }
    let status = child.wait().await?;

    if status.success() {
        Ok(())
    } else {
        Err(PlaybackError::Command {
            program: program.to_string(),
            status: status.to_string(),
        })
    }
}

#[async_trait]
impl Playback for SystemPlayback {
    async fn play_audio(&self, audio: &[u8]) -> Result<(), PlaybackError> {
        debug!("Playing {} bytes of audio", audio.len());
        let audio = audio.to_vec();
        tokio::task::spawn_blocking(move || play_blocking(audio))
            .await
            .map_err(|e| PlaybackError::Task(e.to_string()))?
    }

    async fn speak_locally(&self, text: &str) -> Result<(), PlaybackError> {
        if let Some(synthesizer) = self.synthesizer.as_deref() {
            return pipe_text(synthesizer, text).await;
        }

        for candidate in SYNTHESIZER_CANDIDATES {
            match pipe_text(candidate, text).await {
                Err(PlaybackError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    debug!("Synthesizer '{}' not installed", candidate);
                }
                result => return result,
            }
        }

        println!("(speaking) {text}");
        Ok(())
    }
}
