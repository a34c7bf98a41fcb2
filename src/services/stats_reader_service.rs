use std::{collections::HashMap, sync::Arc};

use crate::{
    auth::{require_owner, require_principal, Principal},
    errors::AppResult,
    models::{
        domain::{Attempt, Exam, UserStats},
        dto::response::RecentActivityDto,
    },
    repositories::{AttemptRepository, ExamRepository, UserStatsRepository},
};

pub const DEFAULT_RECENT_LIMIT: i64 = 10;
pub const MAX_RECENT_LIMIT: i64 = 50;

/// Read side for dashboards. Never writes.
pub struct StatsReaderService {
    stats_repository: Arc<dyn UserStatsRepository>,
    attempt_repository: Arc<dyn AttemptRepository>,
    exam_repository: Arc<dyn ExamRepository>,
}

impl StatsReaderService {
    pub fn new(
        stats_repository: Arc<dyn UserStatsRepository>,
        attempt_repository: Arc<dyn AttemptRepository>,
        exam_repository: Arc<dyn ExamRepository>,
    ) -> Self {
        Self {
            stats_repository,
            attempt_repository,
            exam_repository,
        }
    }

    pub async fn get_user_stats(
        &self,
        principal: Option<&Principal>,
        user_id: &str,
    ) -> AppResult<Option<UserStats>> {
        let principal = require_principal(principal)?;
        require_owner(principal, user_id)?;

        self.stats_repository.find_by_user_id(user_id).await
    }

    pub async fn get_recent_attempts(
        &self,
        principal: Option<&Principal>,
        user_id: &str,
        limit: Option<i64>,
    ) -> AppResult<Vec<Attempt>> {
        let principal = require_principal(principal)?;
        require_owner(principal, user_id)?;

        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, MAX_RECENT_LIMIT);
        self.attempt_repository
            .find_recent_by_user(user_id, limit)
            .await
    }

    pub async fn find_exams_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<Exam>> {
        let mut unique: Vec<String> = slugs.to_vec();
        unique.sort();
        unique.dedup();

        if unique.is_empty() {
            return Ok(Vec::new());
        }

        self.exam_repository.find_by_slugs(&unique).await
    }

    /// Recent attempts with their exam titles. Slugs missing from the catalog
    /// are shown as-is.
    pub async fn get_recent_activity(
        &self,
        principal: Option<&Principal>,
        user_id: &str,
        limit: Option<i64>,
    ) -> AppResult<Vec<RecentActivityDto>> {
        let attempts = self.get_recent_attempts(principal, user_id, limit).await?;

        let slugs: Vec<String> = attempts.iter().map(|a| a.exam_id.clone()).collect();
        let titles: HashMap<String, String> = self
            .find_exams_by_slugs(&slugs)
            .await?
            .into_iter()
            .map(|exam| (exam.exam_id, exam.title))
            .collect();

        Ok(attempts
            .into_iter()
            .map(|attempt| {
                let exam_title = titles
                    .get(&attempt.exam_id)
                    .cloned()
                    .unwrap_or_else(|| attempt.exam_id.clone());
                RecentActivityDto {
                    attempt: attempt.into(),
                    exam_title,
                }
            })
            .collect())
    }
}
