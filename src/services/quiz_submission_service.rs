use std::{sync::Arc, time::Duration};

use async_graphql::SimpleObject;
use serde::Serialize;

use crate::{
    auth::{require_principal, Principal},
    errors::AppResult,
    models::{
        domain::{Attempt, UserStats},
        dto::request::SubmitQuizResultInput,
    },
    repositories::AttemptRepository,
    services::{
        attempt_recorder_service::AttemptRecorderService,
        stats_aggregator_service::StatsAggregatorService,
    },
};

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub attempt: Attempt,
    pub stats: Option<UserStats>,
    pub stats_pending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, SimpleObject)]
pub struct ReplayReport {
    pub scanned: i64,
    pub applied: i64,
    pub already_applied: i64,
}

/// Quiz-completion flow: store the attempt, then fold it into the user's
/// stats, retrying storage failures with exponential backoff.
///
/// The attempt write and the aggregation are independent. When aggregation
/// cannot be completed the attempt stays recorded, the failure is logged with
/// the ids needed to replay it, and the caller is told stats are pending.
pub struct QuizSubmissionService {
    recorder: Arc<AttemptRecorderService>,
    aggregator: Arc<StatsAggregatorService>,
    attempt_repository: Arc<dyn AttemptRepository>,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl QuizSubmissionService {
    pub fn new(
        recorder: Arc<AttemptRecorderService>,
        aggregator: Arc<StatsAggregatorService>,
        attempt_repository: Arc<dyn AttemptRepository>,
        retry_attempts: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            recorder,
            aggregator,
            attempt_repository,
            retry_attempts,
            retry_backoff,
        }
    }

    pub async fn submit_quiz_result(
        &self,
        principal: Option<&Principal>,
        input: &SubmitQuizResultInput,
    ) -> AppResult<SubmissionOutcome> {
        let attempt = self.recorder.record_attempt(principal, input).await?;

        let mut delay = self.retry_backoff;
        let mut retries_left = self.retry_attempts;
        let failure = loop {
            match self.aggregator.apply_recorded_attempt(principal, &attempt).await {
                Ok(stats) => {
                    return Ok(SubmissionOutcome {
                        attempt,
                        stats: Some(stats),
                        stats_pending: false,
                    });
                }
                Err(err) if err.is_retryable() && retries_left > 0 => {
                    log::warn!(
                        "Stats update for attempt {} failed ({}), retrying in {:?}",
                        attempt.id,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    retries_left -= 1;
                }
                Err(err) => break err,
            }
        };

        log::error!(
            "Attempt {} of user {} on exam {} is recorded but not in stats: {}; needs replay",
            attempt.id,
            attempt.user_id,
            attempt.exam_id,
            failure
        );

        Ok(SubmissionOutcome {
            attempt,
            stats: None,
            stats_pending: true,
        })
    }

    /// Re-applies the caller's whole attempt history, oldest first. Attempts
    /// already counted are skipped, so running this repeatedly is harmless.
    pub async fn replay_attempts(&self, principal: Option<&Principal>) -> AppResult<ReplayReport> {
        let principal = require_principal(principal)?;
        let history = self
            .attempt_repository
            .find_all_by_user(&principal.user_id)
            .await?;

        let mut report = ReplayReport::default();
        let mut counted = self.aggregator.ensure_user_stats(Some(principal)).await?;

        for attempt in &history {
            report.scanned += 1;
            if counted.has_applied(&attempt.id) {
                report.already_applied += 1;
                continue;
            }
            let before = counted.version;
            counted = self
                .aggregator
                .apply_recorded_attempt(Some(principal), attempt)
                .await?;
            if counted.version > before {
                report.applied += 1;
            } else {
                report.already_applied += 1;
            }
        }

        log::info!(
            "Replayed {} attempts for user {}: {} applied, {} already counted",
            report.scanned,
            principal.user_id,
            report.applied,
            report.already_applied
        );
        Ok(report)
    }
}
