//! Request extractors shared by application modules

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::AppError;

/// Lenient JSON body.
///
/// Holds `None` when the body is empty or is not valid JSON, leaving the
/// handler to decide what a missing payload means. Content type is not
/// enforced.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Option<Value>);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "failed to read request body");
            AppError::bad_request()
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Self(Some(value))),
            Err(e) => {
                tracing::debug!(error = %e, "request body is not valid JSON");
                Ok(Self(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn extract(body: &'static str) -> Option<Value> {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonBody::from_request(request, &()).await.unwrap().0
    }

    #[tokio::test]
    async fn empty_body_is_none() {
        assert!(extract("").await.is_none());
        assert!(extract("  \n").await.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_none() {
        assert!(extract("{\"title\": ").await.is_none());
    }

    #[tokio::test]
    async fn valid_body_is_parsed() {
        let value = extract(r#"{"title":"Refactoring"}"#).await.unwrap();
        assert_eq!(value["title"], "Refactoring");
    }
}
