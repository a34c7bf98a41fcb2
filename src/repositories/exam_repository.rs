use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use crate::{db::Database, errors::AppResult, models::domain::Exam};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamRepository: Send + Sync {
    async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<Exam>>;
}

pub struct MongoExamRepository {
    collection: Collection<Exam>,
}

impl MongoExamRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl ExamRepository for MongoExamRepository {
    async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<Exam>> {
        let exams = self
            .collection
            .find(doc! { "exam_id": { "$in": slugs.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(exams)
    }
}
