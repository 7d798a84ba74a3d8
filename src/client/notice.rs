use super::error::ClientError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    /// Input problem caught before any request.
    Validation,
    /// A request failed or the server refused it.
    Failure,
    /// The requested post does not exist; the view should return to the feed.
    NotFound,
}

/// User-facing notification. How it is presented is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(kind: NoticeKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, description)
    }

    pub fn validation(description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Validation, "Missing information", description)
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeKind::Failure, title, description)
    }

    pub fn not_found() -> Self {
        Self::new(
            NoticeKind::NotFound,
            "Post not found",
            "The post you are looking for does not exist",
        )
    }

    /// Map a failed call onto a notice. `action` names what was attempted.
    pub fn from_error(action: &str, err: &ClientError) -> Self {
        match err {
            ClientError::NotFound => Self::not_found(),
            ClientError::Remote { status, message } if (400..500).contains(status) => {
                Self::failure(format!("Could not {action}"), message.clone())
            }
            ClientError::Remote { .. } | ClientError::Http(_) => Self::failure(
                format!("Could not {action}"),
                "Something went wrong, please try again",
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self.kind, NoticeKind::Success)
    }
}
