pub mod attempt_recorder_service;
pub mod quiz_submission_service;
pub mod stats_aggregator_service;
pub mod stats_reader_service;

pub use attempt_recorder_service::AttemptRecorderService;
pub use quiz_submission_service::{QuizSubmissionService, ReplayReport, SubmissionOutcome};
pub use stats_aggregator_service::StatsAggregatorService;
pub use stats_reader_service::StatsReaderService;
