use crate::{
    error::{AppError, AppResult},
    models::{report, ReportModel},
    services::post::PostService,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use uuid::Uuid;

const MAX_REASON_LEN: usize = 1000;

pub struct ReportService {
    db: DatabaseConnection,
}

impl ReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Flag a post for moderation. Nothing in this service acts on the flag.
    pub async fn create_report(
        &self,
        post_id: Uuid,
        session: &str,
        reason: &str,
    ) -> AppResult<ReportModel> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("A reason is required".to_string()));
        }
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(AppError::Validation(format!(
                "Reason must be at most {} characters",
                MAX_REASON_LEN
            )));
        }

        PostService::new(self.db.clone()).exists(post_id).await?;

        let model = report::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            post_id: sea_orm::ActiveValue::Set(post_id),
            reason: sea_orm::ActiveValue::Set(reason.to_string()),
            user_session: sea_orm::ActiveValue::Set(session.to_string()),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc()),
        };

        let saved = model.insert(&self.db).await?;
        tracing::info!(%post_id, report_id = %saved.id, "Post reported");
        Ok(saved)
    }
}
