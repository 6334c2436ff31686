use std::sync::Arc;

use nexus_agent::Agent;
use nexus_core::config::Config;
use nexus_core::datasource::registry::SampleDataSourceRegistry;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let registry = Arc::new(SampleDataSourceRegistry);
    let agent = Agent::start(config, registry).await?;

    tracing::info!(addr = %agent.local_addr, "nexus-agent running");
    std::future::pending::<()>().await;
    Ok(())
}
