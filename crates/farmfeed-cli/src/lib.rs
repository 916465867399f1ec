pub mod client;
pub mod commands;
pub mod error;
pub mod feed;
pub mod output;
pub mod playback;

pub use client::{ClientError, FeedApi, HttpFeedApi};
pub use commands::{AdviseCommand, FeedCommand, SpeakCommand, SummarizeCommand};
pub use error::{CliError, CliResult};
pub use feed::{Feed, FeedError, FeedStore, ListenOutcome, Phase, Post, PostId, PostType};
pub use output::{OutputFormat, format_timestamp, truncate_string};
pub use playback::{Playback, PlaybackError, SystemPlayback};
