use crate::{
    error::{AppError, AppResult},
    models::{post, Post, PostModel, Severity},
    services::feed_filter::FeedPredicates,
    utils::geo::{is_valid_latitude, is_valid_longitude},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Fields of a post as submitted by the creation form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub name: String,
    pub email: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub state: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
    pub video_url: Option<String>,
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl NewPost {
    /// Trim text fields and check presence of everything the form marks required.
    pub fn normalized(self) -> AppResult<Self> {
        if !is_valid_latitude(self.latitude) {
            return Err(AppError::Validation(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
        if !is_valid_longitude(self.longitude) {
            return Err(AppError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }

        Ok(Self {
            name: required(&self.name, "Name")?,
            email: optional(self.email.as_deref()),
            title: required(&self.title, "Title")?,
            description: optional(self.description.as_deref()),
            severity: self.severity,
            state: required(&self.state, "State")?,
            city: required(&self.city, "City")?,
            latitude: self.latitude,
            longitude: self.longitude,
            photo_url: required(&self.photo_url, "Photo")?,
            video_url: optional(self.video_url.as_deref()),
        })
    }
}

pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts matching every predicate category, newest first.
    pub async fn list(
        &self,
        predicates: &FeedPredicates,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<PostModel>, u64)> {
        let paginator = Post::find()
            .filter(predicates.to_condition())
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let posts = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((posts, total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<()> {
        self.get_by_id(id).await.map(|_| ())
    }

    pub async fn create(&self, new_post: NewPost) -> AppResult<PostModel> {
        let new_post = new_post.normalized()?;
        let now = chrono::Utc::now().naive_utc();

        let model = post::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            name: sea_orm::ActiveValue::Set(new_post.name),
            email: sea_orm::ActiveValue::Set(new_post.email),
            title: sea_orm::ActiveValue::Set(new_post.title),
            description: sea_orm::ActiveValue::Set(new_post.description),
            severity: sea_orm::ActiveValue::Set(new_post.severity),
            state: sea_orm::ActiveValue::Set(new_post.state),
            city: sea_orm::ActiveValue::Set(new_post.city),
            latitude: sea_orm::ActiveValue::Set(new_post.latitude),
            longitude: sea_orm::ActiveValue::Set(new_post.longitude),
            photo_url: sea_orm::ActiveValue::Set(new_post.photo_url),
            video_url: sea_orm::ActiveValue::Set(new_post.video_url),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
        };

        let post = model.insert(&self.db).await?;
        tracing::info!(post_id = %post.id, severity = %post.severity, "Post created");
        Ok(post)
    }
}
