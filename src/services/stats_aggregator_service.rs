use std::sync::Arc;

use chrono::Utc;

use crate::{
    auth::{require_owner, require_principal, Principal},
    errors::{AppError, AppResult},
    models::domain::{Attempt, AttemptOutcome, UserStats},
    repositories::{UserStatsRepository, WriteOutcome},
};

/// Sole writer of `UserStats` documents.
///
/// Every update is an optimistic read-modify-write: read the document and its
/// version, fold the attempt in, and commit only if nobody else wrote in
/// between. Conflicts restart from a fresh read, so concurrent submissions
/// for one user serialize without losing or double counting an attempt.
pub struct StatsAggregatorService {
    repository: Arc<dyn UserStatsRepository>,
    max_cas_retries: u32,
}

impl StatsAggregatorService {
    pub fn new(repository: Arc<dyn UserStatsRepository>, max_cas_retries: u32) -> Self {
        Self {
            repository,
            max_cas_retries: max_cas_retries.max(1),
        }
    }

    pub async fn apply_attempt(
        &self,
        principal: Option<&Principal>,
        outcome: &AttemptOutcome,
    ) -> AppResult<UserStats> {
        let principal = require_principal(principal)?;
        outcome.validate()?;
        let user_id = principal.user_id.as_str();

        for cas_attempt in 1..=self.max_cas_retries {
            let stored = self.repository.find_by_user_id(user_id).await?;
            let exists = stored.is_some();
            let current = stored.unwrap_or_else(|| UserStats::empty(user_id));

            if current.has_applied(&outcome.attempt_id) {
                log::info!(
                    "Attempt {} already counted for user {}, leaving stats unchanged",
                    outcome.attempt_id,
                    user_id
                );
                return Ok(current);
            }

            let next = current.with_attempt(outcome, Utc::now());
            let written = if exists {
                self.repository
                    .replace_if_version(&next, current.version)
                    .await?
            } else {
                self.repository.insert_new(&next).await?
            };

            match written {
                WriteOutcome::Committed => {
                    log::info!(
                        "Applied attempt {} to stats of user {} (version {} -> {})",
                        outcome.attempt_id,
                        user_id,
                        current.version,
                        next.version
                    );
                    return Ok(next);
                }
                WriteOutcome::Conflict => {
                    log::warn!(
                        "Concurrent stats write for user {} ({}/{}), retrying attempt {}",
                        user_id,
                        cas_attempt,
                        self.max_cas_retries,
                        outcome.attempt_id
                    );
                }
            }
        }

        Err(AppError::PersistenceError(format!(
            "Stats for user '{}' kept changing; gave up after {} conflicting writes",
            user_id, self.max_cas_retries
        )))
    }

    /// Folds a stored attempt into its owner's stats.
    pub async fn apply_recorded_attempt(
        &self,
        principal: Option<&Principal>,
        attempt: &Attempt,
    ) -> AppResult<UserStats> {
        let principal = require_principal(principal)?;
        require_owner(principal, &attempt.user_id)?;

        self.apply_attempt(Some(principal), &AttemptOutcome::from(attempt))
            .await
    }

    /// Creates the all-zero document for a newly registered user. Existing
    /// stats are returned untouched.
    pub async fn ensure_user_stats(&self, principal: Option<&Principal>) -> AppResult<UserStats> {
        let principal = require_principal(principal)?;
        let user_id = principal.user_id.as_str();

        if let Some(existing) = self.repository.find_by_user_id(user_id).await? {
            return Ok(existing);
        }

        let mut empty = UserStats::empty(user_id);
        empty.updated_at = Some(Utc::now());

        match self.repository.insert_new(&empty).await? {
            WriteOutcome::Committed => {
                log::info!("Provisioned empty stats for user {}", user_id);
                Ok(empty)
            }
            WriteOutcome::Conflict => self
                .repository
                .find_by_user_id(user_id)
                .await?
                .ok_or_else(|| {
                    AppError::PersistenceError(format!(
                        "Stats for user '{}' reported as existing but could not be read",
                        user_id
                    ))
                }),
        }
    }
}
