use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::exam::validate_exam_slug;

pub const MAX_SCORE: i32 = 100;

/// One completed quiz submission. Written once, never updated.
///
/// Timestamps are stored as epoch milliseconds so recent-first queries sort
/// numerically instead of on formatted strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attempt {
    pub id: String,
    pub exam_id: String,
    pub user_id: String,
    pub score: i32,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub total_questions: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,
}

impl Attempt {
    /// Builds a finished attempt, deriving `wrong_count` from the totals.
    /// Without a `started_at` both timestamps are the completion time.
    pub fn new(
        user_id: &str,
        exam_id: &str,
        score: i32,
        correct_count: i64,
        total_questions: i64,
        started_at: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        validate_exam_slug(exam_id)?;
        validate_score(score)?;
        if total_questions <= 0 {
            return Err(AppError::ValidationError(
                "total_questions must be greater than zero".to_string(),
            ));
        }
        if correct_count < 0 || correct_count > total_questions {
            return Err(AppError::ValidationError(format!(
                "correct_count must be between 0 and {}, got {}",
                total_questions, correct_count
            )));
        }

        let finished_at = Utc::now();
        let started_at = match started_at {
            Some(started) if started > finished_at => {
                log::warn!(
                    "Client start time {} is ahead of server time {} for user {}, clamping",
                    started,
                    finished_at,
                    user_id
                );
                finished_at
            }
            Some(started) => started,
            None => finished_at,
        };

        Ok(Attempt {
            id: Uuid::new_v4().to_string(),
            exam_id: exam_id.to_string(),
            user_id: user_id.to_string(),
            score,
            correct_count,
            wrong_count: total_questions - correct_count,
            total_questions,
            started_at,
            finished_at,
        })
    }

    pub fn elapsed_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

pub fn validate_score(score: i32) -> AppResult<()> {
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(AppError::ValidationError(format!(
            "score must be between 0 and {}, got {}",
            MAX_SCORE, score
        )));
    }
    Ok(())
}
