mod orchestrator;
mod post;
mod store;

pub use orchestrator::{Feed, ListenOutcome, Submission};
pub use post::{LOCAL_SUMMARY_CHARS, Phase, Post, PostId, PostType, SummarySource, local_summary};
pub use store::{FeedError, FeedStore};
