//! Background orchestration for feed posts
//!
//! Submitting a post returns immediately; summary and advice calls run as
//! spawned tasks that report back through [`FeedStore`] transitions.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::post::{Post, PostId, PostType, SummarySource, local_summary};
use super::store::{FeedError, FeedStore};
use crate::client::FeedApi;
use crate::playback::Playback;

/// How a Listen request was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Audio from the speech proxy was played
    Remote,
    /// On-device speech was used instead
    Local,
    /// The post was already playing; nothing happened
    AlreadyPlaying,
}

/// A submitted post and the task that resolves its background calls
pub struct Submission {
    pub id: PostId,
    /// The post as it was first inserted
    pub post: Post,
    handle: JoinHandle<Option<Post>>,
}

impl Submission {
    /// Wait for every background call, returning the settled post
    pub async fn settled(self) -> Option<Post> {
        match self.handle.await {
            Ok(post) => post,
            Err(e) => {
                warn!("Background task for {} failed: {}", self.id, e);
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct Feed {
    store: Arc<Mutex<FeedStore>>,
    api: Arc<dyn FeedApi>,
    playback: Arc<dyn Playback>,
    author: String,
    voice_id: Option<String>,
}

impl Feed {
    pub fn new(
        api: Arc<dyn FeedApi>,
        playback: Arc<dyn Playback>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(FeedStore::new())),
            api,
            playback,
            author: author.into(),
            voice_id: None,
        }
    }

    /// Voice passed to the speech proxy on Listen
    pub fn with_voice(mut self, voice_id: Option<String>) -> Self {
        self.voice_id = voice_id;
        self
    }

    /// Create a post and start its background calls
    pub async fn submit(
        &self,
        content: impl Into<String>,
        post_type: PostType,
    ) -> Result<Submission, FeedError> {
        let post = Post::new(self.author.clone(), content, post_type);
        let id = post.id;
        let content = post.content.clone();

        {
            let mut store = self.store.lock().await;
            store.insert(post.clone())?;
            store.begin_summary(id)?;
            if post_type == PostType::Question {
                store.begin_advice(id)?;
            }
        }
        info!("Post {} submitted as {}", id, post_type);

        let summary = tokio::spawn(self.clone().summarize(id, content.clone()));
        let advice = (post_type == PostType::Question)
            .then(|| tokio::spawn(self.clone().advise(id, content)));

        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            if let Err(e) = summary.await {
                warn!("Summary task for {} aborted: {}", id, e);
            }
            if let Some(advice) = advice {
                if let Err(e) = advice.await {
                    warn!("Advice task for {} aborted: {}", id, e);
                }
            }

            let mut store = store.lock().await;
            match store.settle(id) {
                Ok(true) => debug!("Post {} is idle", id),
                Ok(false) => warn!("Post {} still has calls in flight", id),
                Err(e) => warn!("Could not settle {}: {}", id, e),
            }
            store.get(id).cloned()
        });

        Ok(Submission { id, post, handle })
    }

    async fn summarize(self, id: PostId, content: String) {
        let (text, source) = match self.api.summarize(&content).await {
            Ok(summary) if !summary.trim().is_empty() => (summary, SummarySource::Provider),
            Ok(_) => {
                warn!("Empty summary for {}, using local fallback", id);
                (local_summary(&content), SummarySource::LocalFallback)
            }
            Err(e) => {
                warn!("Summarize failed for {}: {}, using local fallback", id, e);
                (local_summary(&content), SummarySource::LocalFallback)
            }
        };

        if let Err(e) = self.store.lock().await.summary_arrived(id, text, source) {
            warn!("Dropping summary for {}: {}", id, e);
        }
    }

    async fn advise(self, id: PostId, content: String) {
        let answer = match self.api.advise(&content, None).await {
            Ok(advice) if !advice.final_output.trim().is_empty() => {
                if let Some(note) = &advice.note {
                    debug!("Advice for {} used fallback: {}", id, note);
                }
                Some(advice.final_output)
            }
            Ok(_) => {
                debug!("Empty advice for {}, dropping", id);
                None
            }
            Err(e) => {
                debug!("Advice failed for {}: {}, dropping", id, e);
                None
            }
        };

        let mut store = self.store.lock().await;
        let result = match answer {
            Some(text) => store.advice_arrived(id, text),
            None => store.advice_failed(id),
        };
        if let Err(e) = result {
            warn!("Dropping advice for {}: {}", id, e);
        }
    }

    /// Read the displayed text aloud, preferring the speech proxy
    ///
    /// Resolves when playback has finished. The playback itself runs as its
    /// own task, so dropping this future leaves it to finish and clear
    /// `playing_audio`.
    pub async fn listen(&self, id: PostId) -> Result<ListenOutcome, FeedError> {
        let text = {
            let mut store = self.store.lock().await;
            if !store.start_playback(id)? {
                debug!("Post {} is already playing", id);
                return Ok(ListenOutcome::AlreadyPlaying);
            }
            match store.get(id) {
                Some(post) => post.displayed_text().to_string(),
                None => {
                    store.finish_playback(id)?;
                    return Err(FeedError::UnknownPost(id));
                }
            }
        };

        let feed = self.clone();
        let playback = tokio::spawn(async move {
            let outcome = feed.read_aloud(id, &text).await;
            if let Err(e) = feed.store.lock().await.finish_playback(id) {
                warn!("Could not finish playback for {}: {}", id, e);
            }
            outcome
        });

        match playback.await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("Playback task for {} failed: {}", id, e);
                self.store.lock().await.finish_playback(id)?;
                Err(FeedError::PlaybackInterrupted(id))
            }
        }
    }

    async fn read_aloud(&self, id: PostId, text: &str) -> ListenOutcome {
        match self.api.speak(text, self.voice_id.as_deref()).await {
            Ok(audio) => match self.playback.play_audio(&audio).await {
                Ok(()) => ListenOutcome::Remote,
                Err(e) => {
                    warn!("Audio playback failed for {}: {}", id, e);
                    self.speak_locally(id, text).await
                }
            },
            Err(e) => {
                warn!("Speech failed for {}: {}, speaking locally", id, e);
                self.speak_locally(id, text).await
            }
        }
    }

    async fn speak_locally(&self, id: PostId, text: &str) -> ListenOutcome {
        if let Err(e) = self.playback.speak_locally(text).await {
            warn!("Local speech failed for {}: {}", id, e);
        }
        ListenOutcome::Local
    }

    /// Current posts, newest first
    pub async fn snapshot(&self) -> Vec<Post> {
        self.store.lock().await.posts().cloned().collect()
    }

    pub async fn post(&self, id: PostId) -> Option<Post> {
        self.store.lock().await.get(id).cloned()
    }

    /// Post at 1-based display position
    pub async fn nth(&self, position: usize) -> Option<Post> {
        self.store.lock().await.nth(position).cloned()
    }
}
