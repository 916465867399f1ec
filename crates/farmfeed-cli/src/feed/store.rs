//! State container for feed posts
//!
//! Every mutation goes through a named transition so background tasks can
//! race freely without leaving a post in an impossible state.

use std::collections::HashMap;
use tracing::debug;

use super::post::{Phase, Post, PostId, SummarySource};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("Unknown post: {0}")]
    UnknownPost(PostId),
    #[error("Post {id} cannot {action} while {from}")]
    InvalidTransition {
        id: PostId,
        from: &'static str,
        action: &'static str,
    },
    #[error("Post {0} is not a question")]
    NotAQuestion(PostId),
    #[error("Post content is empty")]
    EmptyContent,
    #[error("Playback of {0} was interrupted")]
    PlaybackInterrupted(PostId),
}

/// Posts keyed by id, newest first
#[derive(Debug, Default)]
pub struct FeedStore {
    posts: HashMap<PostId, Post>,
    order: Vec<PostId>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add a freshly created post at the top of the feed
    pub fn insert(&mut self, post: Post) -> Result<PostId, FeedError> {
        if post.content.trim().is_empty() {
            return Err(FeedError::EmptyContent);
        }
        let id = post.id;
        self.order.insert(0, id);
        self.posts.insert(id, post);
        Ok(id)
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    /// Posts in display order
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.order.iter().filter_map(|id| self.posts.get(id))
    }

    /// Post at 1-based display position
    pub fn nth(&self, position: usize) -> Option<&Post> {
        position
            .checked_sub(1)
            .and_then(|i| self.order.get(i))
            .and_then(|id| self.posts.get(id))
    }

    fn post_mut(&mut self, id: PostId) -> Result<&mut Post, FeedError> {
        self.posts.get_mut(&id).ok_or(FeedError::UnknownPost(id))
    }

    /// `created -> summarizing`
    pub fn begin_summary(&mut self, id: PostId) -> Result<(), FeedError> {
        let post = self.post_mut(id)?;
        if post.phase != Phase::Created {
            return Err(FeedError::InvalidTransition {
                id,
                from: post.phase.as_str(),
                action: "begin summarizing",
            });
        }
        post.phase = Phase::Summarizing;
        post.summary_in_flight = true;
        Ok(())
    }

    /// `summarizing | summarized -> advice pending`, question posts only
    pub fn begin_advice(&mut self, id: PostId) -> Result<(), FeedError> {
        let post = self.post_mut(id)?;
        if post.post_type != super::PostType::Question {
            return Err(FeedError::NotAQuestion(id));
        }
        if !matches!(post.phase, Phase::Summarizing | Phase::Summarized) || post.advice_in_flight
        {
            return Err(FeedError::InvalidTransition {
                id,
                from: post.phase.as_str(),
                action: "request advice",
            });
        }
        post.phase = Phase::AdvicePending;
        post.advice_in_flight = true;
        Ok(())
    }

    /// Record a summary result. Returns whether it is now displayed.
    ///
    /// Advice already in place is never replaced.
    pub fn summary_arrived(
        &mut self,
        id: PostId,
        text: String,
        source: SummarySource,
    ) -> Result<bool, FeedError> {
        let post = self.post_mut(id)?;
        if !post.summary_in_flight {
            return Err(FeedError::InvalidTransition {
                id,
                from: post.phase.as_str(),
                action: "accept a summary",
            });
        }
        post.summary_in_flight = false;

        if post.summary_source == Some(SummarySource::Advice) {
            debug!("Summary for {} arrived after advice, keeping advice", id);
            return Ok(false);
        }

        post.summary = Some(text);
        post.summary_source = Some(source);
        if post.phase == Phase::Summarizing {
            post.phase = Phase::Summarized;
        }
        Ok(true)
    }

    /// `advice pending -> advised`; the advice replaces any summary
    pub fn advice_arrived(&mut self, id: PostId, text: String) -> Result<(), FeedError> {
        let post = self.post_mut(id)?;
        if post.phase != Phase::AdvicePending || !post.advice_in_flight {
            return Err(FeedError::InvalidTransition {
                id,
                from: post.phase.as_str(),
                action: "accept advice",
            });
        }
        post.advice_in_flight = false;
        post.summary = Some(text);
        post.summary_source = Some(SummarySource::Advice);
        post.phase = Phase::Advised;
        Ok(())
    }

    /// Drop an advice request that produced nothing usable
    pub fn advice_failed(&mut self, id: PostId) -> Result<(), FeedError> {
        let post = self.post_mut(id)?;
        if !post.advice_in_flight {
            return Err(FeedError::InvalidTransition {
                id,
                from: post.phase.as_str(),
                action: "drop advice",
            });
        }
        post.advice_in_flight = false;
        post.phase = if post.summary_in_flight {
            Phase::Summarizing
        } else {
            Phase::Summarized
        };
        Ok(())
    }

    /// Move to `idle` once nothing is in flight. Returns whether it did.
    pub fn settle(&mut self, id: PostId) -> Result<bool, FeedError> {
        let post = self.post_mut(id)?;
        if !post.is_settled() {
            return Ok(false);
        }
        post.phase = Phase::Idle;
        Ok(true)
    }

    /// Mark audio as playing. Returns false if it already was.
    pub fn start_playback(&mut self, id: PostId) -> Result<bool, FeedError> {
        let post = self.post_mut(id)?;
        if post.playing_audio {
            return Ok(false);
        }
        post.playing_audio = true;
        Ok(true)
    }

    pub fn finish_playback(&mut self, id: PostId) -> Result<(), FeedError> {
        self.post_mut(id)?.playing_audio = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::PostType;

    fn store_with(post_type: PostType) -> (FeedStore, PostId) {
        let mut store = FeedStore::new();
        let id = store
            .insert(Post::new("Ada", "Is my soil too acidic?", post_type))
            .unwrap();
        store.begin_summary(id).unwrap();
        (store, id)
    }

    #[test]
    fn test_insert_rejects_blank_content() {
        let mut store = FeedStore::new();
        let err = store.insert(Post::new("Ada", "   ", PostType::Update));
        assert_eq!(err, Err(FeedError::EmptyContent));
        assert!(store.is_empty());
    }

    #[test]
    fn test_posts_newest_first() {
        let mut store = FeedStore::new();
        let first = store.insert(Post::new("Ada", "one", PostType::Update)).unwrap();
        let second = store.insert(Post::new("Ada", "two", PostType::Crop)).unwrap();

        let ids: Vec<_> = store.posts().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(store.nth(1).map(|p| p.id), Some(second));
        assert_eq!(store.nth(2).map(|p| p.id), Some(first));
        assert!(store.nth(0).is_none());
        assert!(store.nth(3).is_none());
    }

    #[test]
    fn test_summary_flow() {
        let (mut store, id) = store_with(PostType::Update);
        assert_eq!(store.get(id).unwrap().phase, Phase::Summarizing);
        assert!(!store.settle(id).unwrap());

        let shown = store
            .summary_arrived(id, "Soil pH question.".into(), SummarySource::Provider)
            .unwrap();
        assert!(shown);
        assert_eq!(store.get(id).unwrap().phase, Phase::Summarized);

        assert!(store.settle(id).unwrap());
        let post = store.get(id).unwrap();
        assert_eq!(post.phase, Phase::Idle);
        assert_eq!(post.displayed_text(), "Soil pH question.");
    }

    #[test]
    fn test_begin_summary_twice_is_invalid() {
        let (mut store, id) = store_with(PostType::Update);
        assert!(matches!(
            store.begin_summary(id),
            Err(FeedError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_advice_requires_question() {
        let (mut store, id) = store_with(PostType::Soil);
        assert_eq!(store.begin_advice(id), Err(FeedError::NotAQuestion(id)));
    }

    #[test]
    fn test_advice_after_summary_replaces_it() {
        let (mut store, id) = store_with(PostType::Question);
        store.begin_advice(id).unwrap();

        store
            .summary_arrived(id, "Is my soil too...".into(), SummarySource::LocalFallback)
            .unwrap();
        assert_eq!(store.get(id).unwrap().phase, Phase::AdvicePending);

        store.advice_arrived(id, "Test your pH.".into()).unwrap();
        assert!(store.settle(id).unwrap());

        let post = store.get(id).unwrap();
        assert_eq!(post.displayed_text(), "Test your pH.");
        assert_eq!(post.summary_source, Some(SummarySource::Advice));
    }

    #[test]
    fn test_summary_after_advice_is_not_displayed() {
        let (mut store, id) = store_with(PostType::Question);
        store.begin_advice(id).unwrap();

        store.advice_arrived(id, "Test your pH.".into()).unwrap();
        assert_eq!(store.get(id).unwrap().phase, Phase::Advised);
        assert!(!store.settle(id).unwrap());

        let shown = store
            .summary_arrived(id, "Soil question.".into(), SummarySource::Provider)
            .unwrap();
        assert!(!shown);
        assert!(store.settle(id).unwrap());

        let post = store.get(id).unwrap();
        assert_eq!(post.displayed_text(), "Test your pH.");
        assert_eq!(post.phase, Phase::Idle);
    }

    #[test]
    fn test_failed_advice_keeps_summary() {
        let (mut store, id) = store_with(PostType::Question);
        store.begin_advice(id).unwrap();

        store.advice_failed(id).unwrap();
        assert_eq!(store.get(id).unwrap().phase, Phase::Summarizing);

        store
            .summary_arrived(id, "Soil question.".into(), SummarySource::Provider)
            .unwrap();
        assert!(store.settle(id).unwrap());
        assert_eq!(store.get(id).unwrap().displayed_text(), "Soil question.");
    }

    #[test]
    fn test_duplicate_results_are_rejected() {
        let (mut store, id) = store_with(PostType::Question);
        store.begin_advice(id).unwrap();
        store.advice_arrived(id, "A".into()).unwrap();

        assert!(store.advice_arrived(id, "B".into()).is_err());
        store
            .summary_arrived(id, "S".into(), SummarySource::Provider)
            .unwrap();
        assert!(
            store
                .summary_arrived(id, "S".into(), SummarySource::Provider)
                .is_err()
        );
    }

    #[test]
    fn test_playback_flag_is_exclusive() {
        let (mut store, id) = store_with(PostType::Update);
        assert!(store.start_playback(id).unwrap());
        assert!(!store.start_playback(id).unwrap());
        store.finish_playback(id).unwrap();
        assert!(store.start_playback(id).unwrap());
    }

    #[test]
    fn test_unknown_post() {
        let mut store = FeedStore::new();
        let id = PostId::new();
        assert_eq!(store.settle(id), Err(FeedError::UnknownPost(id)));
    }
}
