//! Post records held by the feed
//!
//! Posts live only as long as the feed that holds them; nothing here is
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Time-ordered post identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(Uuid);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of post the author is sharing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Update,
    Advice,
    Soil,
    Crop,
    Question,
}

impl PostType {
    pub const ALL: [PostType; 5] = [
        PostType::Update,
        PostType::Advice,
        PostType::Soil,
        PostType::Crop,
        PostType::Question,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Update => "update",
            PostType::Advice => "advice",
            PostType::Soil => "soil",
            PostType::Crop => "crop",
            PostType::Question => "question",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        PostType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown post type '{s}'"))
    }
}

/// Where a post sits in its background processing
///
/// `created -> summarizing -> (summarized | advice_pending -> advised) -> idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Created,
    Summarizing,
    Summarized,
    AdvicePending,
    Advised,
    Idle,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::Summarizing => "summarizing",
            Phase::Summarized => "summarized",
            Phase::AdvicePending => "advice pending",
            Phase::Advised => "advised",
            Phase::Idle => "idle",
        }
    }
}

/// Which result produced the text shown in the summary field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// Summarization proxy
    Provider,
    /// Local truncation after the summarization proxy failed
    LocalFallback,
    /// Advice proxy (question posts)
    Advice,
}

/// A single post in the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: String,
    pub content: String,
    /// Derived text shown under the post; advice for answered questions
    pub summary: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub phase: Phase,
    pub summary_source: Option<SummarySource>,
    pub summary_in_flight: bool,
    pub advice_in_flight: bool,
    pub playing_audio: bool,
}

impl Post {
    pub fn new(author: impl Into<String>, content: impl Into<String>, post_type: PostType) -> Self {
        Self {
            id: PostId::new(),
            author: author.into(),
            content: content.into(),
            summary: None,
            timestamp: Utc::now(),
            post_type,
            phase: Phase::Created,
            summary_source: None,
            summary_in_flight: false,
            advice_in_flight: false,
            playing_audio: false,
        }
    }

    /// Text currently on screen for this post: the summary if any, else the content
    pub fn displayed_text(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.content)
    }

    /// No background call is outstanding
    pub fn is_settled(&self) -> bool {
        !self.summary_in_flight && !self.advice_in_flight
    }
}

/// Maximum characters kept by [`local_summary`]
pub const LOCAL_SUMMARY_CHARS: usize = 100;

/// Summary used when the summarization proxy fails
///
/// The first [`LOCAL_SUMMARY_CHARS`] characters of the content, with `...`
/// appended when anything was cut.
pub fn local_summary(content: &str) -> String {
    let content = content.trim();
    match content.char_indices().nth(LOCAL_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", content[..cut].trim_end()),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_type_parse() {
        assert_eq!("question".parse::<PostType>().unwrap(), PostType::Question);
        assert_eq!(" Soil ".parse::<PostType>().unwrap(), PostType::Soil);
        assert!("tractor".parse::<PostType>().is_err());
    }

    #[test]
    fn test_post_type_serializes_lowercase() {
        let json = serde_json::to_string(&PostType::Question).unwrap();
        assert_eq!(json, "\"question\"");
    }

    #[test]
    fn test_new_post_starts_created() {
        let post = Post::new("Ada", "Planted garlic today", PostType::Update);
        assert_eq!(post.phase, Phase::Created);
        assert!(post.summary.is_none());
        assert!(post.is_settled());
        assert!(!post.playing_audio);
        assert_eq!(post.displayed_text(), "Planted garlic today");
    }

    #[test]
    fn test_post_ids_are_distinct_and_time_ordered() {
        let first = PostId::new();
        let second = PostId::new();
        assert_ne!(first, second);
        assert!(first < second);
    }

    #[test]
    fn test_post_serializes_type_field() {
        let post = Post::new("Ada", "Hi", PostType::Crop);
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "crop");
        assert_eq!(json["phase"], "created");
    }

    #[test]
    fn test_local_summary_short_content_unchanged() {
        assert_eq!(local_summary("  Is my soil too acidic?  "), "Is my soil too acidic?");
    }

    #[test]
    fn test_local_summary_truncates_long_content() {
        let content = "a".repeat(250);
        let summary = local_summary(&content);
        assert_eq!(summary.len(), LOCAL_SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_local_summary_respects_char_boundaries() {
        let content = "é".repeat(150);
        let summary = local_summary(&content);
        assert_eq!(summary.chars().count(), LOCAL_SUMMARY_CHARS + 3);
    }
}
