use async_graphql::InputObject;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Final result the quiz UI hands over once the user submits.
#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct SubmitQuizResultInput {
    #[validate(length(min = 1, max = 128))]
    pub exam_id: String,

    #[validate(range(min = 0, max = 100))]
    pub score: i32,

    #[validate(range(min = 0))]
    pub correct_count: i64,

    #[validate(range(min = 1))]
    pub total_questions: i64,

    /// When the quiz was opened, if the client tracked it.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentAttemptsQuery {
    pub limit: Option<i64>,
}
