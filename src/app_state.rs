use std::sync::Arc;

use crate::{
    auth::JwtVerifier,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AttemptRepository, ExamRepository, MongoAttemptRepository, MongoExamRepository,
        MongoUserStatsRepository, UserStatsRepository,
    },
    services::{
        AttemptRecorderService, QuizSubmissionService, StatsAggregatorService, StatsReaderService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub recorder_service: Arc<AttemptRecorderService>,
    pub aggregator_service: Arc<StatsAggregatorService>,
    pub reader_service: Arc<StatsReaderService>,
    pub submission_service: Arc<QuizSubmissionService>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub config: Arc<Config>,
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let attempt_repository = Arc::new(MongoAttemptRepository::new(&db, &config.attempts_collection));
        attempt_repository.ensure_indexes().await?;

        let stats_repository =
            Arc::new(MongoUserStatsRepository::new(&db, &config.user_stats_collection));
        stats_repository.ensure_indexes().await?;

        let exam_repository = Arc::new(MongoExamRepository::new(&db, &config.exams_collection));
        log::info!("Stats storage ready in database '{}'", db.db_name());

        let mut state = Self::with_repositories(
            config,
            stats_repository,
            attempt_repository,
            exam_repository,
        );
        state.db = Some(db);
        Ok(state)
    }

    /// Wires the services over any repository implementation.
    pub fn with_repositories(
        config: Config,
        stats_repository: Arc<dyn UserStatsRepository>,
        attempt_repository: Arc<dyn AttemptRepository>,
        exam_repository: Arc<dyn ExamRepository>,
    ) -> Self {
        let recorder_service = Arc::new(AttemptRecorderService::new(attempt_repository.clone()));
        let aggregator_service = Arc::new(StatsAggregatorService::new(
            stats_repository.clone(),
            config.stats_max_cas_retries,
        ));
        let reader_service = Arc::new(StatsReaderService::new(
            stats_repository,
            attempt_repository.clone(),
            exam_repository,
        ));
        let submission_service = Arc::new(QuizSubmissionService::new(
            recorder_service.clone(),
            aggregator_service.clone(),
            attempt_repository,
            config.stats_retry_attempts,
            config.stats_retry_backoff(),
        ));

        Self {
            recorder_service,
            aggregator_service,
            reader_service,
            submission_service,
            jwt_verifier: Arc::new(JwtVerifier::new(&config.jwt_secret)),
            config: Arc::new(config),
            db: None,
        }
    }
}
