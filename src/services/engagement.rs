use crate::models::{comment, upvote, PostComment, PostModel, PostUpvote};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Read-time engagement figures for one post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub upvote_count: u64,
    pub comment_count: u64,
    pub viewer_has_upvoted: bool,
}

/// Per-listing lookup tables. Posts absent from a table read as 0 / false.
#[derive(Debug, Default, Clone)]
pub struct EngagementIndex {
    upvotes: HashMap<Uuid, u64>,
    comments: HashMap<Uuid, u64>,
    viewer_upvoted: HashSet<Uuid>,
}

impl EngagementIndex {
    pub fn new(
        upvotes: HashMap<Uuid, u64>,
        comments: HashMap<Uuid, u64>,
        viewer_upvoted: HashSet<Uuid>,
    ) -> Self {
        Self {
            upvotes,
            comments,
            viewer_upvoted,
        }
    }

    pub fn get(&self, post_id: &Uuid) -> Engagement {
        Engagement {
            upvote_count: self.upvotes.get(post_id).copied().unwrap_or(0),
            comment_count: self.comments.get(post_id).copied().unwrap_or(0),
            viewer_has_upvoted: self.viewer_upvoted.contains(post_id),
        }
    }

    pub fn annotate(&self, posts: Vec<PostModel>) -> Vec<(PostModel, Engagement)> {
        posts
            .into_iter()
            .map(|p| {
                let engagement = self.get(&p.id);
                (p, engagement)
            })
            .collect()
    }
}

pub struct EngagementService {
    db: DatabaseConnection,
}

impl EngagementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Annotate posts with upvote/comment counts and the viewer's upvote flag.
    ///
    /// Counts are recomputed on every call. A failing batch query degrades to
    /// zero counts for that table instead of failing the feed.
    pub async fn enrich(
        &self,
        posts: Vec<PostModel>,
        viewer_session: Option<&str>,
    ) -> Vec<(PostModel, Engagement)> {
        if posts.is_empty() {
            return Vec::new();
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();

        let (upvotes, comments, viewer_upvoted) = tokio::join!(
            self.upvote_counts(&post_ids),
            self.comment_counts(&post_ids),
            self.viewer_upvoted(&post_ids, viewer_session),
        );

        let index = EngagementIndex::new(
            upvotes.unwrap_or_else(|e| {
                tracing::warn!("Upvote counts unavailable, defaulting to 0: {}", e);
                HashMap::new()
            }),
            comments.unwrap_or_else(|e| {
                tracing::warn!("Comment counts unavailable, defaulting to 0: {}", e);
                HashMap::new()
            }),
            viewer_upvoted.unwrap_or_else(|e| {
                tracing::warn!("Viewer upvotes unavailable, defaulting to false: {}", e);
                HashSet::new()
            }),
        );

        index.annotate(posts)
    }

    pub async fn enrich_one(
        &self,
        post: PostModel,
        viewer_session: Option<&str>,
    ) -> (PostModel, Engagement) {
        let mut enriched = self.enrich(vec![post.clone()], viewer_session).await;
        enriched
            .pop()
            .unwrap_or((post, Engagement::default()))
    }

    async fn upvote_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, DbErr> {
        let rows: Vec<(Uuid, i64)> = PostUpvote::find()
            .select_only()
            .column(upvote::Column::PostId)
            .column_as(Expr::col(upvote::Column::Id).count(), "count")
            .filter(upvote::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(upvote::Column::PostId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }

    async fn comment_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, DbErr> {
        let rows: Vec<(Uuid, i64)> = PostComment::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(comment::Column::PostId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }

    async fn viewer_upvoted(
        &self,
        post_ids: &[Uuid],
        viewer_session: Option<&str>,
    ) -> Result<HashSet<Uuid>, DbErr> {
        let Some(session) = viewer_session else {
            return Ok(HashSet::new());
        };

        let ids: Vec<Uuid> = PostUpvote::find()
            .select_only()
            .column(upvote::Column::PostId)
            .filter(upvote::Column::UserSession.eq(session))
            .filter(upvote::Column::PostId.is_in(post_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids.into_iter().collect())
    }
}
