use crate::{
    error::AppError,
    utils::{
        cookie::{build_session_cookie, extract_cookie, SESSION_COOKIE},
        generate_session_token, is_valid_session_token,
    },
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

pub const SESSION_HEADER: &str = "x-session-id";

/// Pseudo-anonymous viewer identity for this request.
///
/// Advisory only: the token is client-held and trivially forgeable. It scopes
/// upvotes and reports to a browser profile and must never gate access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSession {
    id: String,
    is_new: bool,
}

impl ViewerSession {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Header wins over cookie; malformed values count as absent.
fn presented_session(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| is_valid_session_token(s))
        .or_else(|| {
            extract_cookie(headers, SESSION_COOKIE).filter(|s| is_valid_session_token(s))
        })
}

/// Get-or-create the viewer session and echo newly issued tokens as a cookie.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let session = match presented_session(request.headers()) {
        Some(id) => ViewerSession { id, is_new: false },
        None => ViewerSession {
            id: generate_session_token(),
            is_new: true,
        },
    };

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if session.is_new {
        match HeaderValue::from_str(&build_session_cookie(&session.id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Could not encode session cookie: {}", e),
        }
    }

    response
}

impl<S> FromRequestParts<S> for ViewerSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ViewerSession>()
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("session middleware is not installed"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("user_fromheader"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("user_session=user_fromcookie"),
        );
        assert_eq!(
            presented_session(&headers).as_deref(),
            Some("user_fromheader")
        );
    }

    #[test]
    fn malformed_header_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("not a token!"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("user_session=user_fromcookie"),
        );
        assert_eq!(
            presented_session(&headers).as_deref(),
            Some("user_fromcookie")
        );
    }

    #[test]
    fn nothing_presented() {
        assert_eq!(presented_session(&HeaderMap::new()), None);
    }
}
