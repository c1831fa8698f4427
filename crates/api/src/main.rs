use anyhow::Result;
use wander_agents::ClientConfig;
use wander_api::{build_app, ServerConfig};
use wander_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing("wander_api");

    let server = ServerConfig::from_env();
    let clients = ClientConfig::from_env()?;
    let app = build_app(&server, &clients)?;

    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    tracing::info!(
        bind = %server.bind,
        public_dir = %server.public_dir.display(),
        "wanderwise api started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
