//! In-N-Out-Books application library
//!
//! A JSON API over an in-memory book catalogue, plus login and
//! security-question checks against a fixed list of users.

pub mod modules;

use axum::Router;
use inout_kernel::{settings::Settings, ModuleRegistry};

pub use modules::*;

/// A registry holding every application module, each with fresh state.
pub fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;
    Ok(registry)
}

/// The full HTTP application for the given settings.
pub fn build_app(settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry()?;
    Ok(inout_http::build_router(&registry, settings))
}
