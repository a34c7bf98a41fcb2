use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Attempt,
    repositories::is_duplicate_key,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>>;
    /// Most recently finished first.
    async fn find_recent_by_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<Attempt>>;
    /// Oldest first; used to replay a user's history.
    async fn find_all_by_user(&self, user_id: &str) -> AppResult<Vec<Attempt>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoAttemptRepository {
    collection: Collection<Attempt>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        match self.collection.insert_one(&attempt).await {
            Ok(_) => Ok(attempt),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Attempt with id '{}' already exists",
                attempt.id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_recent_by_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<Attempt>> {
        let attempts = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "finished_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn find_all_by_user(&self, user_id: &str) -> AppResult<Vec<Attempt>> {
        let attempts = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "finished_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_recent_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "finished_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_finished_at".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_recent_index).await?;

        log::info!("Successfully created indexes for attempts collection");
        Ok(())
    }
}
