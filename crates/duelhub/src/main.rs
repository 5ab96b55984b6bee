use duelhub::prelude::*;
use tracing_subscriber::EnvFilter;

/// Overrides the listen address when set.
const BIND_ENV: &str = "DUELHUB_BIND";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut builder = DuelServerBuilder::new();
    if let Ok(addr) = std::env::var(BIND_ENV) {
        builder = builder.bind(&addr);
    }

    let server = builder.build().await?;
    tracing::info!(addr = %server.local_addr()?, "listening");
    server.run().await?;
    Ok(())
}
