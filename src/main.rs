use anyhow::Context;
use inout_kernel::{settings::Settings, InitCtx};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load settings")?;

    inout_telemetry::init(&settings.telemetry)?;

    if let Some(raw) = &settings.server.ignored_port {
        tracing::warn!(value = %raw, port = settings.server.port, "ignoring non-numeric PORT");
    }

    tracing::info!(
        env = ?settings.environment,
        port = settings.server.port,
        "inout-books bootstrap starting"
    );

    let registry = inout_books::build_registry()?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("inout-books bootstrap complete");

    let served = inout_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    served
}
