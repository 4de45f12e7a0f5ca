use anyhow::Result;
use novade_core::config::ConfigLoader;
use novade_core::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            logging::init_minimal_logging();
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    logging::init_logging(&config.logging, false)?;
    tracing::info!("Starting NovaDE extensions service...");

    novade_extensions::service::run(config).await
}
