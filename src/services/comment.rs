use crate::{
    error::{AppError, AppResult},
    models::{comment, CommentModel, PostComment},
    services::post::PostService,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

const MAX_AUTHOR_LEN: usize = 100;
const MAX_CONTENT_LEN: usize = 5000;

pub struct CommentService {
    db: DatabaseConnection,
}

/// Both fields must be non-empty once trimmed.
pub fn validate_comment(author_name: &str, content: &str) -> AppResult<(String, String)> {
    let author_name = author_name.trim();
    let content = content.trim();

    if author_name.is_empty() || content.is_empty() {
        return Err(AppError::Validation(
            "Name and comment are both required".to_string(),
        ));
    }
    if author_name.chars().count() > MAX_AUTHOR_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            MAX_AUTHOR_LEN
        )));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_CONTENT_LEN
        )));
    }

    Ok((author_name.to_string(), content.to_string()))
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Comments in ascending creation order.
    pub async fn list_by_post(&self, post_id: Uuid) -> AppResult<Vec<CommentModel>> {
        PostService::new(self.db.clone()).exists(post_id).await?;

        let comments = PostComment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    pub async fn create(
        &self,
        post_id: Uuid,
        author_name: &str,
        content: &str,
    ) -> AppResult<CommentModel> {
        let (author_name, content) = validate_comment(author_name, content)?;
        PostService::new(self.db.clone()).exists(post_id).await?;

        let new_comment = comment::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            post_id: sea_orm::ActiveValue::Set(post_id),
            author_name: sea_orm::ActiveValue::Set(author_name),
            content: sea_orm::ActiveValue::Set(content),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
        };

        let comment = new_comment.insert(&self.db).await?;
        Ok(comment)
    }
}
