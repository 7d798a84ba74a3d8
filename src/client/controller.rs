use super::notice::Notice;
use super::remote::RemoteStore;
use super::session::SessionId;
use crate::handlers::comment::CommentResponse;
use crate::handlers::post::PostResponse;
use crate::services::upvote::toggled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Per-card comment list. Fetched on first expand, then kept for the
/// lifetime of the card without revalidation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommentCache {
    #[default]
    NotLoaded,
    /// Comments accepted while the first fetch is outstanding.
    Loading { pending: Vec<CommentResponse> },
    Loaded(Vec<CommentResponse>),
}

/// Append comments the fetch may have missed, skipping ones it already saw.
fn merge_pending(
    mut fetched: Vec<CommentResponse>,
    pending: Vec<CommentResponse>,
) -> Vec<CommentResponse> {
    for comment in pending {
        if !fetched.iter().any(|c| c.id == comment.id) {
            fetched.push(comment);
        }
    }
    fetched
}

/// How the local upvote count is settled after a successful write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reconcile {
    /// Keep the locally adjusted count.
    #[default]
    Optimistic,
    /// Replace it with the count the server returned.
    Authoritative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    pub upvote_count: u64,
    pub comment_count: u64,
    pub viewer_has_upvoted: bool,
    pub expanded: bool,
    pub comments: CommentCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpvoteToggle {
    Applied { upvoted: bool, upvote_count: u64 },
    /// The write went out but failed. Local state keeps the optimistic value.
    Failed(Notice),
    /// A toggle for this card is still in flight.
    Busy,
}

/// Clears the in-flight flag when the toggle finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mutating actions of one post card, applied optimistically.
pub struct PostInteractionController {
    remote: Arc<dyn RemoteStore>,
    session: SessionId,
    post_id: Uuid,
    reconcile: Reconcile,
    upvote_in_flight: AtomicBool,
    state: Mutex<CardState>,
}

impl PostInteractionController {
    pub fn new(remote: Arc<dyn RemoteStore>, session: SessionId, post: &PostResponse) -> Self {
        Self {
            remote,
            session,
            post_id: post.id,
            reconcile: Reconcile::default(),
            upvote_in_flight: AtomicBool::new(false),
            state: Mutex::new(CardState {
                upvote_count: post.upvote_count,
                comment_count: post.comment_count,
                viewer_has_upvoted: post.viewer_has_upvoted,
                expanded: false,
                comments: CommentCache::NotLoaded,
            }),
        }
    }

    pub fn with_reconcile(mut self, reconcile: Reconcile) -> Self {
        self.reconcile = reconcile;
        self
    }

    pub fn post_id(&self) -> Uuid {
        self.post_id
    }

    pub async fn snapshot(&self) -> CardState {
        self.state.lock().await.clone()
    }

    /// Flip this session's upvote. The direction comes from the local flag.
    pub async fn toggle_upvote(&self) -> UpvoteToggle {
        if self.upvote_in_flight.swap(true, Ordering::Acquire) {
            return UpvoteToggle::Busy;
        }
        let _guard = InFlight(&self.upvote_in_flight);

        let (upvoted, upvote_count) = {
            let mut state = self.state.lock().await;
            let (upvoted, count) = toggled(state.viewer_has_upvoted, state.upvote_count);
            state.viewer_has_upvoted = upvoted;
            state.upvote_count = count;
            (upvoted, count)
        };

        match self
            .remote
            .set_upvote(self.post_id, &self.session, upvoted)
            .await
        {
            Ok(confirmed) => {
                let mut state = self.state.lock().await;
                if self.reconcile == Reconcile::Authoritative {
                    state.viewer_has_upvoted = confirmed.upvoted;
                    state.upvote_count = confirmed.upvote_count;
                }
                UpvoteToggle::Applied {
                    upvoted: state.viewer_has_upvoted,
                    upvote_count: state.upvote_count,
                }
            }
            Err(e) => {
                tracing::warn!(
                    post_id = %self.post_id,
                    upvoted,
                    upvote_count,
                    "Upvote write failed: {}",
                    e
                );
                UpvoteToggle::Failed(Notice::from_error("update upvote", &e))
            }
        }
    }

    /// Add a comment. Blank fields are rejected without a request.
    pub async fn add_comment(
        &self,
        author_name: &str,
        content: &str,
    ) -> Result<CommentResponse, Notice> {
        let author_name = author_name.trim();
        let content = content.trim();
        if author_name.is_empty() || content.is_empty() {
            return Err(Notice::validation(
                "Please enter both your name and a comment",
            ));
        }

        let comment = self
            .remote
            .add_comment(self.post_id, author_name, content)
            .await
            .map_err(|e| {
                tracing::warn!(post_id = %self.post_id, "Comment write failed: {}", e);
                Notice::from_error("add comment", &e)
            })?;

        let mut state = self.state.lock().await;
        state.comment_count += 1;
        match &mut state.comments {
            CommentCache::Loaded(comments) | CommentCache::Loading { pending: comments } => {
                comments.push(comment.clone())
            }
            CommentCache::NotLoaded => {}
        }
        Ok(comment)
    }

    /// Flag the post. An empty reason does nothing.
    pub async fn report(&self, reason: &str) -> Option<Notice> {
        let reason = reason.trim();
        if reason.is_empty() {
            return None;
        }

        match self
            .remote
            .report_post(self.post_id, &self.session, reason)
            .await
        {
            Ok(()) => Some(Notice::success(
                "Report submitted",
                "Thanks, the post has been flagged for review",
            )),
            Err(e) => {
                tracing::warn!(post_id = %self.post_id, "Report write failed: {}", e);
                Some(Notice::from_error("report post", &e))
            }
        }
    }

    /// Collapse or expand the comment list, fetching it on first expand.
    pub async fn toggle_comments(&self) -> Option<Notice> {
        {
            let mut state = self.state.lock().await;
            state.expanded = !state.expanded;
            if !state.expanded || state.comments != CommentCache::NotLoaded {
                return None;
            }
            state.comments = CommentCache::Loading {
                pending: Vec::new(),
            };
        }

        let fetched = self.remote.list_comments(self.post_id).await;

        let mut state = self.state.lock().await;
        match fetched {
            Ok(fetched) => {
                let pending = match std::mem::take(&mut state.comments) {
                    CommentCache::Loading { pending } => pending,
                    _ => Vec::new(),
                };
                state.comments = CommentCache::Loaded(merge_pending(fetched, pending));
                None
            }
            Err(e) => {
                tracing::warn!(post_id = %self.post_id, "Comment load failed: {}", e);
                state.comments = CommentCache::NotLoaded;
                Some(Notice::from_error("load comments", &e))
            }
        }
    }
}
