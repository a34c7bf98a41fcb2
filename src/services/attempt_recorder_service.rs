use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_principal, Principal},
    errors::AppResult,
    models::{domain::Attempt, dto::request::SubmitQuizResultInput},
    repositories::AttemptRepository,
};

/// Appends finished attempts to a user's history. Never touches aggregates.
pub struct AttemptRecorderService {
    repository: Arc<dyn AttemptRepository>,
}

impl AttemptRecorderService {
    pub fn new(repository: Arc<dyn AttemptRepository>) -> Self {
        Self { repository }
    }

    pub async fn record_attempt(
        &self,
        principal: Option<&Principal>,
        input: &SubmitQuizResultInput,
    ) -> AppResult<Attempt> {
        let principal = require_principal(principal)?;
        input.validate()?;

        let attempt = Attempt::new(
            &principal.user_id,
            &input.exam_id,
            input.score,
            input.correct_count,
            input.total_questions,
            input.started_at,
        )?;

        let attempt = self.repository.create(attempt).await?;
        log::info!(
            "Recorded attempt {} for user {} on exam {} (score {})",
            attempt.id,
            attempt.user_id,
            attempt.exam_id,
            attempt.score
        );
        Ok(attempt)
    }
}
