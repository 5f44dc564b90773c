use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wordlink::prelude::*;

#[tokio::main]
async fn main() -> Result<(), WordlinkError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "wordlink=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let server = WordlinkServerBuilder::from_config(&config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server.run().await
}
