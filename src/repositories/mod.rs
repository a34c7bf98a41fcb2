pub mod attempt_repository;
pub mod exam_repository;
pub mod user_stats_repository;

pub use attempt_repository::{AttemptRepository, MongoAttemptRepository};
pub use exam_repository::{ExamRepository, MongoExamRepository};
pub use user_stats_repository::{MongoUserStatsRepository, UserStatsRepository, WriteOutcome};

use mongodb::error::{ErrorKind, WriteFailure};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}
