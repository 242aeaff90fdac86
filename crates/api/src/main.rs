use anyhow::Context;

use votecast_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    votecast_observability::init(Config::log_format_from_env()?);

    let config = Config::from_env()?;
    let app = votecast_api::app::build_app(&config).await?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
