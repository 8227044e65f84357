use anyhow::Context;

use stallbook_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stallbook_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    if config.allow_set_sold {
        tracing::warn!("absolute quantity_sold overwrites are enabled");
    }

    let app = stallbook_api::app::build_app(&config).context("failed to open record store")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
