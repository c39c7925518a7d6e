//! Database connectivity smoke test.
//!
//! Opens the repository the server would use, runs a health query and prints
//! the database clock. Exits non-zero when either step fails.

use std::env;
use std::process::ExitCode;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use liga_agil::db::repository::AccountRepository;
use liga_agil::db::RepositoryFactory;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();

    let (repository, config) = RepositoryFactory::from_discovered_config().await?;
    match config {
        Some(c) => info!("Using repository.toml (type = {})", c.repository.repo_type),
        None => info!("Using repository settings from the environment"),
    }

    match repository.health_check().await {
        Ok(true) => info!("Database connection OK"),
        Ok(false) => {
            error!("Database answered the health query but reported unhealthy");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            error!("Database health check failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    match repository.server_time().await {
        Ok(now) => {
            info!("Database server time: {}", now.to_rfc3339());
            println!("{}", now.to_rfc3339());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Could not read the database clock: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
