use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::CliResult;
use crate::feed::{Feed, ListenOutcome, Post, PostType};
use crate::output::{OutputFormat, format_timestamp, truncate_string};

#[derive(Parser)]
pub struct FeedCommand {
    #[clap(
        long,
        short = 't',
        default_value = "update",
        help = "Post type used when a line has no type prefix (update, advice, soil, crop, question)"
    )]
    pub default_type: PostType,
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum FeedInput {
    Post { post_type: PostType, content: String },
    List,
    Listen(usize),
    Help,
    Quit,
    Empty,
}

impl FeedInput {
    /// `question: ...` style prefixes pick the post type; `/` starts a command
    pub fn parse(line: &str, default_type: PostType) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(FeedInput::Empty);
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            return match (parts.next(), parts.next()) {
                (Some("list"), None) => Ok(FeedInput::List),
                (Some("quit" | "exit"), None) => Ok(FeedInput::Quit),
                (Some("help"), None) => Ok(FeedInput::Help),
                (Some("listen"), Some(n)) => n
                    .parse()
                    .map(FeedInput::Listen)
                    .map_err(|_| format!("Not a post number: {n}")),
                _ => Err(format!("Unknown command: /{command}")),
            };
        }

        if let Some((prefix, rest)) = line.split_once(':') {
            if let Ok(post_type) = prefix.parse::<PostType>() {
                let content = rest.trim();
                if content.is_empty() {
                    return Ok(FeedInput::Empty);
                }
                return Ok(FeedInput::Post {
                    post_type,
                    content: content.to_string(),
                });
            }
        }

        Ok(FeedInput::Post {
            post_type: default_type,
            content: line.to_string(),
        })
    }
}

const HELP: &str = "\
Type a post and press enter. Prefix with a type to change it, e.g.
  question: Is my soil too acidic?
Commands:
  /list        show the feed
  /listen <n>  read post n aloud
  /quit        leave";

impl FeedCommand {
    pub async fn execute(&self, feed: &Feed, format: OutputFormat) -> CliResult<()> {
        println!("{HELP}\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let input = match FeedInput::parse(&line, self.default_type) {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };

            match input {
                FeedInput::Empty => {}
                FeedInput::Quit => break,
                FeedInput::Help => println!("{HELP}"),
                FeedInput::List => print_feed(&feed.snapshot().await, format)?,
                FeedInput::Post { post_type, content } => {
                    let submission = feed.submit(content, post_type).await?;
                    println!(
                        "Posted {} ({})",
                        truncate_string(&submission.id.to_string(), 8),
                        post_type
                    );

                    tokio::spawn(async move {
                        if let Some(post) = submission.settled().await {
                            println!(
                                "\n[{}] {}",
                                truncate_string(&post.id.to_string(), 8),
                                post.displayed_text()
                            );
                        }
                    });
                }
                FeedInput::Listen(position) => {
                    let Some(post) = feed.nth(position).await else {
                        eprintln!("No post #{position}");
                        continue;
                    };

                    let feed = feed.clone();
                    tokio::spawn(async move {
                        match feed.listen(post.id).await {
                            Ok(ListenOutcome::AlreadyPlaying) => {
                                println!("Already playing #{position}")
                            }
                            Ok(ListenOutcome::Local) => {
                                println!("Read #{position} with local speech")
                            }
                            Ok(ListenOutcome::Remote) => {}
                            Err(e) => eprintln!("Listen failed: {e}"),
                        }
                    });
                }
            }
        }

        Ok(())
    }
}

fn print_feed(posts: &[Post], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(posts)?);
        }
        OutputFormat::Table => {
            if posts.is_empty() {
                println!("No posts yet.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(["#", "Author", "Type", "Post", "Summary", "Status", "Posted"]);

            for (i, post) in posts.iter().enumerate() {
                let status = if post.playing_audio {
                    format!("{} (playing)", post.phase.as_str())
                } else {
                    post.phase.as_str().to_string()
                };
                table.add_row([
                    (i + 1).to_string(),
                    post.author.clone(),
                    post.post_type.to_string(),
                    truncate_string(&post.content, 50),
                    post.summary
                        .as_deref()
                        .map(|s| truncate_string(s, 60))
                        .unwrap_or_else(|| "-".to_string()),
                    status,
                    format_timestamp(&post.timestamp),
                ]);
            }

            println!("{table}");
            println!("\nTotal: {} posts", posts.len());
        }
    }

    Ok(())
}
