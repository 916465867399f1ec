use clap::Parser;

use crate::client::FeedApi;
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct SummarizeCommand {
    #[clap(help = "Text to summarize")]
    pub text: String,
}

impl SummarizeCommand {
    pub async fn execute(&self, api: &dyn FeedApi, format: OutputFormat) -> CliResult<()> {
        let summary = api.summarize(&self.text).await?;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({ "summary": summary });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => println!("{summary}"),
        }

        Ok(())
    }
}
