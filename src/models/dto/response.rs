use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::domain::{Attempt, Exam, UserStats},
    services::SubmissionOutcome,
};

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PerExamStatsDto {
    pub exam_id: String,
    pub attempts: i64,
    pub sum_scores: i64,
    pub best_score: i32,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct UserStatsDto {
    pub user_id: String,
    /// Fraction in 0..1.
    pub accuracy: f64,
    pub accuracy_percent: i32,
    pub total_correct: i64,
    pub total_wrong: i64,
    pub total_questions: i64,
    pub total_exams: i64,
    pub per_exam: Vec<PerExamStatsDto>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserStats> for UserStatsDto {
    fn from(stats: UserStats) -> Self {
        let mut per_exam: Vec<PerExamStatsDto> = stats
            .per_exam
            .into_iter()
            .map(|(exam_id, exam)| PerExamStatsDto {
                exam_id,
                attempts: exam.attempts,
                sum_scores: exam.sum_scores,
                best_score: exam.best_score,
                average_score: exam.average_score,
            })
            .collect();
        per_exam.sort_by(|a, b| a.exam_id.cmp(&b.exam_id));

        UserStatsDto {
            user_id: stats.user_id,
            accuracy: stats.accuracy,
            accuracy_percent: (stats.accuracy * 100.0).round() as i32,
            total_correct: stats.total_correct,
            total_wrong: stats.total_wrong,
            total_questions: stats.total_questions,
            total_exams: stats.total_exams,
            per_exam,
            updated_at: stats.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AttemptDto {
    pub id: String,
    pub exam_id: String,
    pub score: i32,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub total_questions: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_seconds: i64,
}

impl From<Attempt> for AttemptDto {
    fn from(attempt: Attempt) -> Self {
        AttemptDto {
            elapsed_seconds: attempt.elapsed_seconds(),
            id: attempt.id,
            exam_id: attempt.exam_id,
            score: attempt.score,
            correct_count: attempt.correct_count,
            wrong_count: attempt.wrong_count,
            total_questions: attempt.total_questions,
            started_at: attempt.started_at,
            finished_at: attempt.finished_at,
        }
    }
}

/// An attempt joined with the catalog title of its exam.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct RecentActivityDto {
    pub attempt: AttemptDto,
    pub exam_title: String,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ExamDto {
    pub id: String,
    pub exam_id: String,
    pub exam_type_id: String,
    pub title: String,
    pub question_count: i64,
    pub time_limit_sec: i64,
}

impl From<Exam> for ExamDto {
    fn from(exam: Exam) -> Self {
        ExamDto {
            id: exam.id,
            exam_id: exam.exam_id,
            exam_type_id: exam.exam_type_id,
            title: exam.title,
            question_count: exam.question_count,
            time_limit_sec: exam.time_limit_sec,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SubmitQuizResultResponse {
    pub attempt: AttemptDto,
    pub stats: Option<UserStatsDto>,
    /// The attempt is stored but the aggregate has not caught up yet.
    pub stats_pending: bool,
    pub message: String,
}

impl From<SubmissionOutcome> for SubmitQuizResultResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        let message = if outcome.stats_pending {
            "Your result was recorded, but your statistics may take a moment to update"
        } else {
            "Your result was recorded"
        };
        Self {
            attempt: outcome.attempt.into(),
            stats: outcome.stats.map(UserStatsDto::from),
            stats_pending: outcome.stats_pending,
            message: message.to_string(),
        }
    }
}
