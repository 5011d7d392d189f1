use anyhow::Context;

use galley_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    galley_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr;
    let app = galley_api::app::build_app(config)
        .await
        .context("failed to start kitchen services")?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
