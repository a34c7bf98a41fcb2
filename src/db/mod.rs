use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

const APP_NAME: &str = "examprep-server";

/// Handle on the application database. Cheap to clone; every repository
/// gets its collections from here.
#[derive(Clone)]
pub struct Database {
    database: mongodb::Database,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let options = client_options(config).await?;
        let client = Client::with_options(options)?;
        let database = client.database(&config.mongo_db_name);

        let db = Self { database };
        db.health_check().await?;
        log::info!(
            "Connected to MongoDB database '{}' (pool {})",
            db.db_name(),
            config.mongo_max_pool_size
        );
        Ok(db)
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.database.collection(collection_name)
    }

    /// Pings the application database itself, so a missing grant on it shows
    /// up as not ready.
    pub async fn health_check(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub fn db_name(&self) -> &str {
        self.database.name()
    }
}

async fn client_options(config: &Config) -> AppResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
    let timeout = Duration::from_secs(config.mongo_timeout_secs);

    options.app_name = Some(APP_NAME.to_string());
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
    options.max_pool_size = Some(config.mongo_max_pool_size);
    options.min_pool_size = Some(config.mongo_max_pool_size.min(2));
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);
    options.retry_writes = Some(true);
    Ok(options)
}
