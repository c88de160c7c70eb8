use mongodb::{Client, Database};
use std::sync::Arc;
use tracing::info;

use crate::config::settings::Settings;

pub async fn init_database(settings: &Settings) -> mongodb::error::Result<Arc<Database>> {
    let client = Client::with_uri_str(&settings.mongo_uri).await?;
    let database = client.database(&settings.database_name);
    info!(database = %settings.database_name, "Database handle initialized");
    Ok(Arc::new(database))
}
