//! In-memory `RemoteStore` used by the client tests.

use super::error::{ClientError, ClientResult};
use super::remote::{PhotoAttachment, RemoteStore};
use super::session::SessionId;
use crate::handlers::comment::CommentResponse;
use crate::handlers::post::{CreatePostRequest, PostResponse};
use crate::handlers::stats::StatsResponse;
use crate::handlers::upvote::UpvoteResponse;
use crate::models::Severity;
use crate::response::PaginatedResponse;
use crate::services::feed_filter::FeedPredicates;
use crate::services::feed_filter::FeedItem;
use crate::utils::external_map_url;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use uuid::Uuid;

impl FeedItem for PostResponse {
    fn severity(&self) -> Severity {
        self.severity
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn state(&self) -> &str {
        &self.state
    }
}

#[derive(Default)]
pub struct FakeRemote {
    posts: Mutex<Vec<PostResponse>>,
    upvotes: Mutex<HashSet<(Uuid, String)>>,
    comments: Mutex<HashMap<Uuid, Vec<CommentResponse>>>,
    pub reports: Mutex<Vec<(Uuid, String, String)>>,
    pub uploads: Mutex<Vec<String>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_post_creation: AtomicBool,
    pub calls: AtomicUsize,
    comment_gate: Mutex<Option<Arc<Notify>>>,
}

pub fn sample_post(title: &str, severity: Severity, minutes_ago: i64) -> PostResponse {
    PostResponse {
        id: Uuid::new_v4(),
        name: "Jane".to_string(),
        title: title.to_string(),
        description: None,
        severity,
        state: "CA".to_string(),
        city: "Springfield".to_string(),
        latitude: 37.12,
        longitude: -122.45,
        photo_url: "/uploads/post-photos/1-a.jpg".to_string(),
        video_url: None,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
        upvote_count: 0,
        comment_count: 0,
        viewer_has_upvoted: false,
        map_url: external_map_url(37.12, -122.45),
    }
}

fn unavailable() -> ClientError {
    ClientError::Remote {
        status: 503,
        message: "store unavailable".to_string(),
    }
}

impl FakeRemote {
    pub fn with_posts(posts: Vec<PostResponse>) -> Self {
        let fake = Self::default();
        *fake.posts.lock().unwrap() = posts;
        fake
    }

    /// Make `list_comments` read its snapshot, then wait for the returned gate.
    pub fn hold_comment_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.comment_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn upvote_count(&self, id: Uuid) -> u64 {
        self.upvotes
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == id)
            .count() as u64
    }

    fn read(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn write(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn enrich(&self, mut post: PostResponse, session: &SessionId) -> PostResponse {
        let upvotes = self.upvotes.lock().unwrap();
        post.upvote_count = upvotes.iter().filter(|(p, _)| *p == post.id).count() as u64;
        post.viewer_has_upvoted = upvotes.contains(&(post.id, session.to_string()));
        post.comment_count = self
            .comments
            .lock()
            .unwrap()
            .get(&post.id)
            .map(|c| c.len() as u64)
            .unwrap_or(0);
        post
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn list_posts(
        &self,
        predicates: &FeedPredicates,
        page: u64,
        per_page: u64,
        session: &SessionId,
    ) -> ClientResult<PaginatedResponse<PostResponse>> {
        self.read()?;
        let mut matching: Vec<PostResponse> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| predicates.matches(*p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .map(|p| self.enrich(p, session))
            .collect();
        Ok(PaginatedResponse::new(items, total, page, per_page))
    }

    async fn get_post(&self, id: Uuid, session: &SessionId) -> ClientResult<PostResponse> {
        self.read()?;
        let post = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ClientError::NotFound)?;
        Ok(self.enrich(post, session))
    }

    async fn create_post(&self, request: &CreatePostRequest) -> ClientResult<PostResponse> {
        self.write()?;
        if self.fail_post_creation.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let severity = request
            .severity
            .as_deref()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ClientError::Remote {
                status: 400,
                message: "Severity is required".to_string(),
            })?;
        let mut post = sample_post(&request.title, severity, 0);
        post.name = request.name.clone();
        post.state = request.state.clone();
        post.city = request.city.clone();
        post.photo_url = request.photo_url.clone();
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn upload_image(&self, photo: &PhotoAttachment) -> ClientResult<String> {
        self.write()?;
        let url = format!("/uploads/post-photos/0-{}", photo.filename);
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn set_upvote(
        &self,
        id: Uuid,
        session: &SessionId,
        upvoted: bool,
    ) -> ClientResult<UpvoteResponse> {
        self.write()?;
        let mut upvotes = self.upvotes.lock().unwrap();
        let key = (id, session.to_string());
        if upvoted {
            upvotes.insert(key);
        } else {
            upvotes.remove(&key);
        }
        let upvote_count = upvotes.iter().filter(|(p, _)| *p == id).count() as u64;
        Ok(UpvoteResponse {
            upvoted,
            upvote_count,
        })
    }

    async fn list_comments(&self, id: Uuid) -> ClientResult<Vec<CommentResponse>> {
        self.read()?;
        let comments = self
            .comments
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default();
        let gate = self.comment_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(comments)
    }

    async fn add_comment(
        &self,
        id: Uuid,
        author_name: &str,
        content: &str,
    ) -> ClientResult<CommentResponse> {
        self.write()?;
        let comment = CommentResponse {
            id: Uuid::new_v4(),
            post_id: id,
            author_name: author_name.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.comments
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn report_post(&self, id: Uuid, session: &SessionId, reason: &str) -> ClientResult<()> {
        self.write()?;
        self.reports
            .lock()
            .unwrap()
            .push((id, session.to_string(), reason.to_string()));
        Ok(())
    }

    async fn stats(&self) -> ClientResult<StatsResponse> {
        self.read()?;
        let posts = self.posts.lock().unwrap();
        let count = |s: Severity| posts.iter().filter(|p| p.severity == s).count() as u64;
        Ok(StatsResponse {
            total_posts: posts.len() as u64,
            this_week: posts.len() as u64,
            high_priority: count(Severity::High),
            medium_priority: count(Severity::Medium),
            low_priority: count(Severity::Low),
        })
    }
}
