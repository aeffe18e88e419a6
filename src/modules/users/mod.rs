pub mod models;
pub mod routes;
pub mod verifier;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use inout_kernel::{InitCtx, Module};
use serde_json::json;

use verifier::UserDirectory;

/// Login and security-question verification against the fixed user list
pub struct UsersModule {
    directory: Arc<UserDirectory>,
}

impl UsersModule {
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.directory.is_empty(),
            "user directory has no accounts"
        );

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            users = self.directory.len(),
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.directory))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let message = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/login": {
                    "post": {
                        "summary": "Check an email/password pair",
                        "tags": ["Users"],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/LoginRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": message("Authentication successful"),
                            "400": message("Bad Request"),
                            "401": message("Unauthorized")
                        }
                    }
                },
                "/users/{email}/verify-security-question": {
                    "post": {
                        "summary": "Check the user's security answers, in order",
                        "tags": ["Users"],
                        "parameters": [{
                            "name": "email",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/SecurityAnswer" }
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": message("Security questions successfully answered"),
                            "400": message("Bad Request"),
                            "401": message("Unauthorized")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "LoginRequest": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string" }
                        },
                        "required": ["email", "password"]
                    },
                    "SecurityAnswer": {
                        "type": "object",
                        "properties": {
                            "answer": { "type": "string" }
                        },
                        "required": ["answer"],
                        "additionalProperties": false
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a users module over the process-wide user directory
pub fn create_module() -> anyhow::Result<Arc<dyn Module>> {
    let directory = UserDirectory::seeded()?;
    Ok(Arc::new(UsersModule::new(directory)))
}
