use crate::{
    error::AppResult,
    models::{upvote, PostUpvote},
    services::post::PostService,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Statement,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpvoteState {
    pub upvoted: bool,
    pub upvote_count: u64,
}

pub struct UpvoteService {
    db: DatabaseConnection,
}

impl UpvoteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Make this session's upvote on the post present or absent.
    ///
    /// Each direction is a single statement against the unique
    /// (post_id, user_session) index, so repeating a request is harmless and
    /// two racing requests cannot produce a duplicate row.
    pub async fn set_upvote(
        &self,
        post_id: Uuid,
        session: &str,
        upvoted: bool,
    ) -> AppResult<UpvoteState> {
        PostService::new(self.db.clone()).exists(post_id).await?;

        if upvoted {
            self.db
                .execute(Statement::from_sql_and_values(
                    sea_orm::DatabaseBackend::Postgres,
                    "INSERT INTO post_upvotes (id, post_id, user_session, created_at)
                     VALUES ($1, $2, $3, NOW())
                     ON CONFLICT (post_id, user_session) DO NOTHING",
                    vec![Uuid::new_v4().into(), post_id.into(), session.into()],
                ))
                .await?;
        } else {
            PostUpvote::delete_many()
                .filter(upvote::Column::PostId.eq(post_id))
                .filter(upvote::Column::UserSession.eq(session))
                .exec(&self.db)
                .await?;
        }

        let upvote_count = self.count_for_post(post_id).await?;
        tracing::debug!(%post_id, upvoted, upvote_count, "Upvote state set");

        Ok(UpvoteState {
            upvoted,
            upvote_count,
        })
    }

    pub async fn count_for_post(&self, post_id: Uuid) -> AppResult<u64> {
        let count = PostUpvote::find()
            .filter(upvote::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}

/// Local counter transition for one toggle: remove when currently upvoted,
/// add otherwise.
pub fn toggled(upvoted: bool, upvote_count: u64) -> (bool, u64) {
    if upvoted {
        (false, upvote_count.saturating_sub(1))
    } else {
        (true, upvote_count + 1)
    }
}
