//! Movie Store Server - HTTP REST API binary
//!
//! Reads `.env`, an optional `server.*` config file and `MOVIE_STORE__*`
//! environment variables, then serves until Ctrl+C or SIGTERM.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
