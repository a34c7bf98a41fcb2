use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::domain::attempt::{validate_score, Attempt};
use crate::models::domain::exam::validate_exam_slug;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PerExamStats {
    pub attempts: i64,
    pub sum_scores: i64,
    pub best_score: i32,
    pub average_score: f64,
}

/// Running aggregate of every attempt a user has completed.
///
/// `version` is the compare-and-swap token: every committed write stores
/// `version + 1` and only succeeds if the stored document still carries the
/// version that was read. `applied_attempt_ids` makes folding an attempt
/// idempotent.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserStats {
    pub user_id: String,
    pub accuracy: f64,
    pub total_correct: i64,
    pub total_wrong: i64,
    pub total_questions: i64,
    pub total_exams: i64,
    #[serde(default)]
    pub per_exam: HashMap<String, PerExamStats>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub applied_attempt_ids: BTreeSet<String>,
}

/// The counts one attempt contributes to the aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub attempt_id: String,
    pub exam_id: String,
    pub score: i32,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub total_questions: i64,
}

impl AttemptOutcome {
    pub fn validate(&self) -> AppResult<()> {
        if self.attempt_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "attempt_id cannot be empty".to_string(),
            ));
        }
        validate_exam_slug(&self.exam_id)?;
        validate_score(self.score)?;
        if self.total_questions <= 0 {
            return Err(AppError::ValidationError(
                "total_questions must be greater than zero".to_string(),
            ));
        }
        if self.correct_count < 0 || self.wrong_count < 0 {
            return Err(AppError::ValidationError(
                "correct_count and wrong_count cannot be negative".to_string(),
            ));
        }
        if self.correct_count + self.wrong_count != self.total_questions {
            return Err(AppError::ValidationError(format!(
                "correct_count ({}) + wrong_count ({}) must equal total_questions ({})",
                self.correct_count, self.wrong_count, self.total_questions
            )));
        }
        Ok(())
    }
}

impl From<&Attempt> for AttemptOutcome {
    fn from(attempt: &Attempt) -> Self {
        AttemptOutcome {
            attempt_id: attempt.id.clone(),
            exam_id: attempt.exam_id.clone(),
            score: attempt.score,
            correct_count: attempt.correct_count,
            wrong_count: attempt.wrong_count,
            total_questions: attempt.total_questions,
        }
    }
}

pub fn accuracy(total_correct: i64, total_questions: i64) -> f64 {
    if total_questions > 0 {
        total_correct as f64 / total_questions as f64
    } else {
        0.0
    }
}

impl PerExamStats {
    fn record(&self, score: i32) -> PerExamStats {
        let attempts = self.attempts + 1;
        let sum_scores = self.sum_scores + i64::from(score);
        PerExamStats {
            attempts,
            sum_scores,
            best_score: self.best_score.max(score),
            average_score: sum_scores as f64 / attempts as f64,
        }
    }
}

impl UserStats {
    pub fn empty(user_id: &str) -> Self {
        UserStats {
            user_id: user_id.to_string(),
            accuracy: 0.0,
            total_correct: 0,
            total_wrong: 0,
            total_questions: 0,
            total_exams: 0,
            per_exam: HashMap::new(),
            updated_at: None,
            version: 0,
            applied_attempt_ids: BTreeSet::new(),
        }
    }

    pub fn has_applied(&self, attempt_id: &str) -> bool {
        self.applied_attempt_ids.contains(attempt_id)
    }

    pub fn exam(&self, exam_id: &str) -> Option<&PerExamStats> {
        self.per_exam.get(exam_id)
    }

    /// Returns the next state with `outcome` folded in. Pure: the caller
    /// decides whether the result may be committed.
    pub fn with_attempt(&self, outcome: &AttemptOutcome, now: DateTime<Utc>) -> UserStats {
        let total_correct = self.total_correct + outcome.correct_count;
        let total_wrong = self.total_wrong + outcome.wrong_count;
        let total_questions = self.total_questions + outcome.total_questions;

        let prev_exam = self.per_exam.get(&outcome.exam_id).cloned().unwrap_or_default();
        let mut per_exam = self.per_exam.clone();
        per_exam.insert(outcome.exam_id.clone(), prev_exam.record(outcome.score));

        let mut applied_attempt_ids = self.applied_attempt_ids.clone();
        applied_attempt_ids.insert(outcome.attempt_id.clone());

        UserStats {
            user_id: self.user_id.clone(),
            accuracy: accuracy(total_correct, total_questions),
            total_correct,
            total_wrong,
            total_questions,
            total_exams: self.total_exams + 1,
            per_exam,
            updated_at: Some(now),
            version: self.version + 1,
            applied_attempt_ids,
        }
    }
}
