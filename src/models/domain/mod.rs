pub mod attempt;
pub mod exam;
pub mod user_stats;
pub use attempt::Attempt;
pub use exam::Exam;
pub use user_stats::{AttemptOutcome, PerExamStats, UserStats};
