use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::{header, request::Parts, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::JsonApiError;
use crate::negotiate::{Format, JSON, XML};

/// `{id}` path segment: ASCII digits that fit the id type. Anything else is a 404,
/// the same as an unrouted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i32);

pub fn parse_id(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| JsonApiError::not_found())?;
        parse_id(&raw).map(ResourceId).ok_or_else(JsonApiError::not_found)
    }
}

/// Request body decoded as JSON or XML according to `Content-Type`.
pub struct Body<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Body<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or_default().to_string());
        let format = Format::from_content_type(content_type.as_deref()).ok_or_else(|| {
            JsonApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Media Type",
                Some(format!("expected {JSON} or {XML}")),
            )
        })?;
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| JsonApiError::bad_request(e.body_text()))?;
        format.decode(&bytes).map(Body).map_err(JsonApiError::bad_request)
    }
}

#[cfg(test)]
mod tests {
    use super::parse_id;

    #[test]
    fn digits_only() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("007"), Some(7));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("+1"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1e3"), None);
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(parse_id("2147483647"), Some(i32::MAX));
        assert_eq!(parse_id("2147483648"), None);
    }
}
