use anyhow::Context;

use carestock_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    carestock_observability::init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "invalid configuration; using defaults");
        AppConfig::default()
    });

    let app = carestock_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
