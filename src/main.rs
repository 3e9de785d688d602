use clap::Parser;
use firesight::{Config, MapServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let server = MapServer::new(config)?;
    server.start().await
}
