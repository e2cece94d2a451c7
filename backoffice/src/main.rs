use std::sync::Arc;

use anyhow::Context;
use backoffice::{Config, Dashboard, init_logger_with_file};
use hub_client::{ChangeFeed, RestTableClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(backend = %config.backend_url, "back-office dashboard starting");

    let client_config = config.client_config();
    let client = Arc::new(RestTableClient::new(&client_config).context("could not build the table client")?);

    let dashboard = Dashboard::new(client, &config);
    dashboard
        .initialize()
        .await
        .context("initial table fetch failed")?;

    let feed = ChangeFeed::open(&client_config)
        .await
        .context("could not open the change feed")?;
    let events = feed.subscribe();

    tokio::select! {
        result = dashboard.run(events) => {
            result.context("change feed processing failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }

    feed.close();
    Ok(())
}
