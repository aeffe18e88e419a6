//! Error handling for the HTTP layer

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::{Timestamp, Uuid};

/// Message returned for every 500, whatever the underlying fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Standard error response format for all HTTP errors
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Internal fault details attached to a 500 response as an extension.
///
/// Only [`expose_internal_details`] reads it, and only in development mode.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// The generic 400 used for malformed request shapes
    pub fn bad_request() -> Self {
        Self::validation("Bad Request")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v7(Timestamp::now(uuid::NoContext));
        let status = self.status();

        let (message, detail) = match self {
            AppError::Validation { message }
            | AppError::NotFound { message }
            | AppError::Unauthorized { message } => {
                tracing::warn!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    %message,
                    "request rejected"
                );
                (message, None)
            }
            AppError::Internal(e) => {
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = %e,
                    "request failed"
                );
                (
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    Some(InternalDetail(format!("{e:?}"))),
                )
            }
        };

        let body = ErrorBody {
            message,
            stack: None,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

/// Middleware that rewrites 500 bodies to include the fault's stack when
/// `dev_mode` is set. Production responses pass through untouched.
pub async fn expose_internal_details(
    State(dev_mode): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(InternalDetail(stack)) = response.extensions_mut().remove::<InternalDetail>() else {
        return response;
    };
    if !dev_mode {
        return response;
    }

    let body = ErrorBody {
        message: INTERNAL_ERROR_MESSAGE.to_string(),
        stack: Some(stack),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Panic handler for `CatchPanicLayer`: same body as any other internal fault.
pub fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn failing() -> Result<&'static str, AppError> {
        Err(anyhow::anyhow!("database connection failed").into())
    }

    fn app(dev_mode: bool) -> Router {
        Router::new()
            .route("/fail", get(failing))
            .layer(axum::middleware::from_fn_with_state(
                dev_mode,
                expose_internal_details,
            ))
    }

    async fn call(router: Router) -> Response {
        router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/fail")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = AppError::validation("title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "title is required" })
        );
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            AppError::not_found("book not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized("Unauthorized").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::bad_request().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details_in_production() {
        let response = call(app(false)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "Internal Server Error" })
        );
    }

    #[tokio::test]
    async fn test_internal_error_carries_stack_in_development() {
        let response = call(app(true)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal Server Error");
        assert!(body["stack"]
            .as_str()
            .unwrap()
            .contains("database connection failed"));
    }

    #[tokio::test]
    async fn test_panic_maps_to_internal_error() {
        let response = handle_panic(Box::new("exploded"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<InternalDetail>().is_some());
        assert_eq!(body_json(response).await["message"], "Internal Server Error");
    }
}
