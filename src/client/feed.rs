use super::notice::Notice;
use super::remote::RemoteStore;
use super::session::SessionIdentityProvider;
use crate::handlers::post::PostResponse;
use crate::handlers::stats::StatsResponse;
use crate::response::{resolve_pagination, PaginatedResponse};
use crate::services::feed_filter::{build_predicates, FeedFilters};
use std::sync::Arc;
use uuid::Uuid;

/// One rendered feed page. `notice` is set when the load failed.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<PostResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    pub notice: Option<Notice>,
}

impl FeedPage {
    fn empty(page: u64, notice: Notice) -> Self {
        Self {
            posts: Vec::new(),
            total: 0,
            page,
            total_pages: 0,
            notice: Some(notice),
        }
    }
}

impl From<PaginatedResponse<PostResponse>> for FeedPage {
    fn from(p: PaginatedResponse<PostResponse>) -> Self {
        Self {
            posts: p.items,
            total: p.total,
            page: p.page,
            total_pages: p.total_pages,
            notice: None,
        }
    }
}

/// Outcome of opening a single post.
#[derive(Debug, Clone)]
pub enum PostView {
    Loaded(PostResponse),
    /// The post is gone; go back to the feed root.
    Redirect(Notice),
    Failed(Notice),
}

/// Loads feeds and single posts. Remote failures never escape: they come
/// back as notices next to an empty result.
pub struct FeedLoader {
    remote: Arc<dyn RemoteStore>,
    identity: Arc<SessionIdentityProvider>,
}

impl FeedLoader {
    pub fn new(remote: Arc<dyn RemoteStore>, identity: Arc<SessionIdentityProvider>) -> Self {
        Self { remote, identity }
    }

    pub async fn load(
        &self,
        filters: &FeedFilters,
        search: Option<&str>,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> FeedPage {
        let (page, per_page) = resolve_pagination(page, per_page);
        let predicates = build_predicates(filters, search);
        let session = self.identity.get_or_create_session_id();

        match self
            .remote
            .list_posts(&predicates, page, per_page, &session)
            .await
        {
            Ok(result) => result.into(),
            Err(e) => {
                tracing::warn!("Feed load failed: {}", e);
                FeedPage::empty(page, Notice::from_error("load posts", &e))
            }
        }
    }

    pub async fn open_post(&self, id: Uuid) -> PostView {
        let session = self.identity.get_or_create_session_id();
        match self.remote.get_post(id, &session).await {
            Ok(post) => PostView::Loaded(post),
            Err(super::ClientError::NotFound) => PostView::Redirect(Notice::not_found()),
            Err(e) => {
                tracing::warn!(%id, "Post load failed: {}", e);
                PostView::Failed(Notice::from_error("load post", &e))
            }
        }
    }

    /// Community stats, all zero when unavailable.
    pub async fn stats(&self) -> (StatsResponse, Option<Notice>) {
        match self.remote.stats().await {
            Ok(stats) => (stats, None),
            Err(e) => {
                tracing::warn!("Stats load failed: {}", e);
                (
                    StatsResponse::default(),
                    Some(Notice::from_error("load statistics", &e)),
                )
            }
        }
    }
}
