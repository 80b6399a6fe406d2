//! MySQL storage for the legacy content tables and the page tables.

mod content;
mod pages;

pub use content::MySqlContentRepository;
pub use pages::MySqlPageGateway;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::config::MigrationConfig;
use crate::error::Result;

pub async fn create_pool(config: &MigrationConfig) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    Ok(pool)
}
