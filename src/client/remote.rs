use super::error::{ClientError, ClientResult};
use super::session::SessionId;
use crate::handlers::comment::{CommentResponse, CreateCommentRequest};
use crate::handlers::post::{CreatePostRequest, PostResponse};
use crate::handlers::report::CreateReportRequest;
use crate::handlers::stats::StatsResponse;
use crate::handlers::upload::{UploadResponse, UPLOAD_FIELD};
use crate::handlers::upvote::{SetUpvoteRequest, UpvoteResponse};
use crate::middleware::SESSION_HEADER;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::feed_filter::FeedPredicates;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Image bytes picked in the post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the client reads from or writes to the backend.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_posts(
        &self,
        predicates: &FeedPredicates,
        page: u64,
        per_page: u64,
        session: &SessionId,
    ) -> ClientResult<PaginatedResponse<PostResponse>>;

    async fn get_post(&self, id: Uuid, session: &SessionId) -> ClientResult<PostResponse>;

    async fn create_post(&self, request: &CreatePostRequest) -> ClientResult<PostResponse>;

    async fn upload_image(&self, photo: &PhotoAttachment) -> ClientResult<String>;

    async fn set_upvote(
        &self,
        id: Uuid,
        session: &SessionId,
        upvoted: bool,
    ) -> ClientResult<UpvoteResponse>;

    async fn list_comments(&self, id: Uuid) -> ClientResult<Vec<CommentResponse>>;

    async fn add_comment(
        &self,
        id: Uuid,
        author_name: &str,
        content: &str,
    ) -> ClientResult<CommentResponse>;

    async fn report_post(&self, id: Uuid, session: &SessionId, reason: &str) -> ClientResult<()>;

    async fn stats(&self) -> ClientResult<StatsResponse>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// `RemoteStore` over the JSON API.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ApiResponse<T>>()
            .await?
            .into_data()
            .ok_or_else(|| ClientError::Remote {
                status: status.as_u16(),
                message: "Response carried no data".to_string(),
            })
    }
}

fn feed_query(
    predicates: &FeedPredicates,
    page: u64,
    per_page: u64,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
    if let Some(severity) = predicates.severity {
        query.push(("severity", severity.to_string()));
    }
    if let Some(location) = &predicates.location {
        query.push(("location", location.clone()));
    }
    if let Some(search) = &predicates.search {
        query.push(("q", search.clone()));
    }
    query
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_posts(
        &self,
        predicates: &FeedPredicates,
        page: u64,
        per_page: u64,
        session: &SessionId,
    ) -> ClientResult<PaginatedResponse<PostResponse>> {
        let request = self
            .client
            .get(self.url("/posts"))
            .header(SESSION_HEADER, session.as_str())
            .query(&feed_query(predicates, page, per_page));
        self.send(request).await
    }

    async fn get_post(&self, id: Uuid, session: &SessionId) -> ClientResult<PostResponse> {
        let request = self
            .client
            .get(self.url(&format!("/posts/{id}")))
            .header(SESSION_HEADER, session.as_str());
        self.send(request).await
    }

    async fn create_post(&self, request: &CreatePostRequest) -> ClientResult<PostResponse> {
        let request = self.client.post(self.url("/posts")).json(request);
        self.send(request).await
    }

    async fn upload_image(&self, photo: &PhotoAttachment) -> ClientResult<String> {
        let part = reqwest::multipart::Part::bytes(photo.bytes.clone())
            .file_name(photo.filename.clone())
            .mime_str(&photo.content_type)?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let request = self.client.post(self.url("/upload/image")).multipart(form);
        let uploaded: UploadResponse = self.send(request).await?;
        Ok(uploaded.url)
    }

    async fn set_upvote(
        &self,
        id: Uuid,
        session: &SessionId,
        upvoted: bool,
    ) -> ClientResult<UpvoteResponse> {
        let request = self
            .client
            .put(self.url(&format!("/posts/{id}/upvote")))
            .header(SESSION_HEADER, session.as_str())
            .json(&SetUpvoteRequest { upvoted });
        self.send(request).await
    }

    async fn list_comments(&self, id: Uuid) -> ClientResult<Vec<CommentResponse>> {
        let request = self.client.get(self.url(&format!("/posts/{id}/comments")));
        self.send(request).await
    }

    async fn add_comment(
        &self,
        id: Uuid,
        author_name: &str,
        content: &str,
    ) -> ClientResult<CommentResponse> {
        let request = self
            .client
            .post(self.url(&format!("/posts/{id}/comments")))
            .json(&CreateCommentRequest {
                author_name: author_name.to_string(),
                content: content.to_string(),
            });
        self.send(request).await
    }

    async fn report_post(&self, id: Uuid, session: &SessionId, reason: &str) -> ClientResult<()> {
        let request = self
            .client
            .post(self.url(&format!("/posts/{id}/reports")))
            .header(SESSION_HEADER, session.as_str())
            .json(&CreateReportRequest {
                reason: reason.to_string(),
            });
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    async fn stats(&self) -> ClientResult<StatsResponse> {
        self.send(self.client.get(self.url("/stats"))).await
    }
}
