use clap::Parser;

use crate::client::FeedApi;
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct AdviseCommand {
    #[clap(help = "Farming question or prompt")]
    pub prompt: String,

    #[clap(long, short, help = "Model to request instead of the server default")]
    pub model: Option<String>,
}

impl AdviseCommand {
    pub async fn execute(&self, api: &dyn FeedApi, format: OutputFormat) -> CliResult<()> {
        let advice = api.advise(&self.prompt, self.model.as_deref()).await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&advice)?);
            }
            OutputFormat::Table => {
                println!("{}", advice.final_output);
                if let Some(note) = &advice.note {
                    println!("\n({note})");
                }
            }
        }

        Ok(())
    }
}
