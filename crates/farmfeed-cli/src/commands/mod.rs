pub mod advise;
pub mod feed;
pub mod speak;
pub mod summarize;

pub use advise::AdviseCommand;
pub use feed::FeedCommand;
pub use speak::SpeakCommand;
pub use summarize::SummarizeCommand;
