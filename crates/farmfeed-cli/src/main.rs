use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use farmfeed_cli::client::HttpFeedApi;
use farmfeed_cli::commands::{AdviseCommand, FeedCommand, SpeakCommand, SummarizeCommand};
use farmfeed_cli::error::CliResult;
use farmfeed_cli::feed::Feed;
use farmfeed_cli::output::OutputFormat;
use farmfeed_cli::playback::SystemPlayback;

#[derive(Parser)]
#[command(name = "farmfeed-cli")]
#[command(about = "Farmfeed CLI - Terminal client for the farm community feed")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(
        long,
        short,
        global = true,
        default_value = "http://127.0.0.1:3000",
        help = "Base URL of the farmfeed daemon"
    )]
    pub server: String,

    #[clap(long, short, global = true, default_value = "You", help = "Author name for new posts")]
    pub author: String,

    #[clap(long, global = true, help = "Voice id passed to the speech route")]
    pub voice: Option<String>,

    #[clap(
        long,
        global = true,
        help = "Local speech command that reads text from stdin, e.g. \"espeak --stdin\""
    )]
    pub synthesizer: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Interactive feed session")]
    Feed(FeedCommand),

    #[clap(about = "Summarize text through the daemon")]
    Summarize(SummarizeCommand),

    #[clap(about = "Ask for farming advice")]
    Advise(AdviseCommand),

    #[clap(about = "Synthesize speech and play or save it")]
    Speak(SpeakCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    init_logging();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let api = Arc::new(HttpFeedApi::new(cli.server.clone()));
    let playback = Arc::new(SystemPlayback::new(cli.synthesizer.clone()));
    tracing::debug!("Using daemon at {}", api.base_url());

    match &cli.command {
        Command::Summarize(cmd) => cmd.execute(api.as_ref(), format).await,
        Command::Advise(cmd) => cmd.execute(api.as_ref(), format).await,
        Command::Speak(cmd) => {
            cmd.execute(api.as_ref(), playback.as_ref(), cli.voice.as_deref(), format)
                .await
        }
        Command::Feed(cmd) => {
            let feed = Feed::new(api, playback, cli.author.clone()).with_voice(cli.voice.clone());
            cmd.execute(&feed, format).await
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,farmfeed_cli=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
