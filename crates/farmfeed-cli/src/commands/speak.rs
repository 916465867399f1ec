use std::path::PathBuf;

use clap::Parser;

use crate::client::FeedApi;
use crate::error::CliResult;
use crate::output::OutputFormat;
use crate::playback::Playback;

#[derive(Parser)]
pub struct SpeakCommand {
    #[clap(help = "Text to read aloud")]
    pub text: String,

    #[clap(long, short, help = "Write the audio to this file instead of playing it")]
    pub out: Option<PathBuf>,
}

impl SpeakCommand {
    pub async fn execute(
        &self,
        api: &dyn FeedApi,
        playback: &dyn Playback,
        voice_id: Option<&str>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let audio = api.speak(&self.text, voice_id).await?;

        match &self.out {
            Some(path) => tokio::fs::write(path, &audio).await?,
            None => playback.play_audio(&audio).await?,
        }

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "bytes": audio.len(),
                    "file": self.out.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => match &self.out {
                Some(path) => println!("Wrote {} bytes to {}", audio.len(), path.display()),
                None => println!("Played {} bytes of audio", audio.len()),
            },
        }

        Ok(())
    }
}
