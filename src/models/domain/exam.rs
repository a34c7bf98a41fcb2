use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

static EXAM_SLUG_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[a-z0-9][a-z0-9_-]{0,127}$").expect("EXAM_SLUG_REGEX is a valid regex pattern")
});

pub const DEFAULT_EXAM_TITLE: &str = "Exam";

/// Catalog entry. Read-only reference data; `exam_id` is the slug attempts
/// and per-exam stats are keyed by, `id` is the storage id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Exam {
    pub id: String,
    pub exam_id: String,
    #[serde(default)]
    pub exam_type_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub question_count: i64,
    #[serde(default)]
    pub time_limit_sec: i64,
}

fn default_title() -> String {
    DEFAULT_EXAM_TITLE.to_string()
}

/// Slugs become field names inside the per-exam map of a stats document,
/// so `.` and `$` must never reach storage.
pub fn validate_exam_slug(slug: &str) -> AppResult<()> {
    if !EXAM_SLUG_REGEX.is_match(slug) {
        return Err(AppError::ValidationError(format!(
            "Invalid exam slug '{}': expected lowercase letters, digits, '_' or '-'",
            slug
        )));
    }
    Ok(())
}
