use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database, errors::AppResult, models::domain::UserStats, repositories::is_duplicate_key,
};

/// Result of a conditional write. `Conflict` means another writer got there
/// first and nothing was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Committed,
    Conflict,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<UserStats>>;
    /// Stores `stats` only if the user has no document yet.
    async fn insert_new(&self, stats: &UserStats) -> AppResult<WriteOutcome>;
    /// Replaces the user's document only if its stored version is still
    /// `expected_version`.
    async fn replace_if_version(
        &self,
        stats: &UserStats,
        expected_version: i64,
    ) -> AppResult<WriteOutcome>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserStatsRepository {
    collection: Collection<UserStats>,
}

impl MongoUserStatsRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl UserStatsRepository for MongoUserStatsRepository {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<UserStats>> {
        let stats = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await?;
        Ok(stats)
    }

    async fn insert_new(&self, stats: &UserStats) -> AppResult<WriteOutcome> {
        // The unique index on user_id turns a racing insert into a duplicate key error.
        match self.collection.insert_one(stats).await {
            Ok(_) => Ok(WriteOutcome::Committed),
            Err(err) if is_duplicate_key(&err) => Ok(WriteOutcome::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn replace_if_version(
        &self,
        stats: &UserStats,
        expected_version: i64,
    ) -> AppResult<WriteOutcome> {
        let result = self
            .collection
            .replace_one(
                doc! { "user_id": stats.user_id.as_str(), "version": expected_version },
                stats,
            )
            .await?;

        if result.matched_count == 0 {
            return Ok(WriteOutcome::Conflict);
        }
        Ok(WriteOutcome::Committed)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for user_stats collection");

        let user_id_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(user_id_index).await?;

        log::info!("Successfully created indexes for user_stats collection");
        Ok(())
    }
}
