use anyhow::{Context, Result};
use cookai_api_client::ApiClient;
use cookai_runtime_config::ClientConfig;

pub async fn run_health(config: &ClientConfig) -> Result<()> {
    let client = ApiClient::new(&config.server.url).context("Failed to create HTTP client")?;
    let health = client
        .health()
        .await
        .with_context(|| format!("Server at {} is not healthy", client.base_url()))?;
    println!("{}: {}", client.base_url(), health.message);
    Ok(())
}
