//! HTTP handlers for login and security-question verification.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use inout_http::{AppError, JsonBody};
use serde_json::{json, Value};

use super::models::{Credentials, SecurityAnswer};
use super::verifier::UserDirectory;

const UNAUTHORIZED: &str = "Unauthorized";

/// Account routes, relative to `/api`.
pub fn router(directory: Arc<UserDirectory>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route(
            "/users/{email}/verify-security-question",
            post(verify_security_question),
        )
        .with_state(directory)
}

async fn login(
    State(directory): State<Arc<UserDirectory>>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, AppError> {
    let credentials = Credentials::from_json(body).ok_or_else(AppError::bad_request)?;
    let email = credentials.email.to_lowercase();

    // Argon2 verification blocks; run it on the blocking pool.
    let verified = tokio::task::spawn_blocking(move || {
        directory.verify_password(&credentials.email, &credentials.password)
    })
    .await
    .context("password verification task failed")?
    .map_err(anyhow::Error::from)?;

    if !verified {
        tracing::info!(%email, "login rejected");
        return Err(AppError::unauthorized(UNAUTHORIZED));
    }

    tracing::info!(%email, "login succeeded");
    Ok(Json(json!({ "message": "Authentication successful" })))
}

async fn verify_security_question(
    State(directory): State<Arc<UserDirectory>>,
    Path(email): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, AppError> {
    let answers = SecurityAnswer::list_from_json(body).ok_or_else(AppError::bad_request)?;

    if !directory.verify_security_answers(&email, &answers) {
        tracing::info!(email = %email.to_lowercase(), "security answers rejected");
        return Err(AppError::unauthorized(UNAUTHORIZED));
    }

    tracing::info!(email = %email.to_lowercase(), "security answers accepted");
    Ok(Json(json!({ "message": "Security questions successfully answered" })))
}
