use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_principal, OptionalPrincipal},
    errors::AppError,
    models::{
        domain::UserStats,
        dto::{
            request::{RecentAttemptsQuery, SubmitQuizResultInput},
            response::{SubmitQuizResultResponse, UserStatsDto},
        },
    },
};

#[get("/api/stats/me")]
async fn get_my_stats(
    state: web::Data<AppState>,
    auth: OptionalPrincipal,
) -> Result<HttpResponse, AppError> {
    let principal = require_principal(auth.principal())?;

    let stats = state
        .reader_service
        .get_user_stats(Some(principal), &principal.user_id)
        .await?
        .unwrap_or_else(|| UserStats::empty(&principal.user_id));
    Ok(HttpResponse::Ok().json(UserStatsDto::from(stats)))
}

#[get("/api/attempts/recent")]
async fn get_recent_attempts(
    state: web::Data<AppState>,
    query: web::Query<RecentAttemptsQuery>,
    auth: OptionalPrincipal,
) -> Result<HttpResponse, AppError> {
    let principal = require_principal(auth.principal())?;

    let activity = state
        .reader_service
        .get_recent_activity(Some(principal), &principal.user_id, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(activity))
}

#[post("/api/attempts")]
async fn submit_attempt(
    state: web::Data<AppState>,
    request: web::Json<SubmitQuizResultInput>,
    auth: OptionalPrincipal,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .submission_service
        .submit_quiz_result(auth.principal(), &request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(SubmitQuizResultResponse::from(outcome)))
}

#[post("/api/stats/provision")]
async fn provision_stats(
    state: web::Data<AppState>,
    auth: OptionalPrincipal,
) -> Result<HttpResponse, AppError> {
    let stats = state
        .aggregator_service
        .ensure_user_stats(auth.principal())
        .await?;
    Ok(HttpResponse::Ok().json(UserStatsDto::from(stats)))
}

#[post("/api/stats/replay")]
async fn replay_attempts(
    state: web::Data<AppState>,
    auth: OptionalPrincipal,
) -> Result<HttpResponse, AppError> {
    let report = state
        .submission_service
        .replay_attempts(auth.principal())
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{jwt::sign_test_token, Claims, JwtVerifier},
        config::Config,
        models::domain::AttemptOutcome,
        repositories::{
            attempt_repository::MockAttemptRepository, exam_repository::MockExamRepository,
            user_stats_repository::MockUserStatsRepository, WriteOutcome,
        },
    };
    use actix_web::{http::StatusCode, test, App};
    use chrono::Utc;
    use std::sync::Arc;

    fn state_with(
        stats: MockUserStatsRepository,
        attempts: MockAttemptRepository,
        exams: MockExamRepository,
    ) -> AppState {
        AppState::with_repositories(
            Config::test_config(),
            Arc::new(stats),
            Arc::new(attempts),
            Arc::new(exams),
        )
    }

    fn bearer(user_id: &str) -> (&'static str, String) {
        let config = Config::test_config();
        let token = sign_test_token(&config.jwt_secret, &Claims::for_subject(user_id, 3600));
        ("Authorization", format!("Bearer {}", token))
    }

    macro_rules! app {
        ($state:expr) => {{
            let state: AppState = $state;
            let verifier: Arc<JwtVerifier> = state.jwt_verifier.clone();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .app_data(web::Data::from(verifier))
                    .service(get_my_stats)
                    .service(get_recent_attempts)
                    .service(submit_attempt)
                    .service(provision_stats)
                    .service(replay_attempts),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_my_stats_without_token_is_unauthorized() {
        let mut stats = MockUserStatsRepository::new();
        stats.expect_find_by_user_id().never();
        let app = app!(state_with(
            stats,
            MockAttemptRepository::new(),
            MockExamRepository::new()
        ));

        let req = test::TestRequest::get().uri("/api/stats/me").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_my_stats_defaults_to_zeroes_for_new_user() {
        let mut stats = MockUserStatsRepository::new();
        stats.expect_find_by_user_id().returning(|_| Ok(None));
        let app = app!(state_with(
            stats,
            MockAttemptRepository::new(),
            MockExamRepository::new()
        ));

        let req = test::TestRequest::get()
            .uri("/api/stats/me")
            .insert_header(bearer("uid-1"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["user_id"], "uid-1");
        assert_eq!(body["total_exams"], 0);
        assert_eq!(body["accuracy_percent"], 0);
    }

    #[actix_web::test]
    async fn test_submit_attempt_returns_created_with_stats() {
        let mut attempts = MockAttemptRepository::new();
        attempts.expect_create().times(1).returning(|a| Ok(a));

        let mut stats = MockUserStatsRepository::new();
        stats.expect_find_by_user_id().returning(|_| Ok(None));
        stats
            .expect_insert_new()
            .times(1)
            .returning(|_| Ok(WriteOutcome::Committed));

        let app = app!(state_with(stats, attempts, MockExamRepository::new()));

        let req = test::TestRequest::post()
            .uri("/api/attempts")
            .insert_header(bearer("uid-1"))
            .set_json(serde_json::json!({
                "exam_id": "net101",
                "score": 80,
                "correct_count": 8,
                "total_questions": 10
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["stats_pending"], false);
        assert_eq!(body["stats"]["total_exams"], 1);
        assert_eq!(body["attempt"]["wrong_count"], 2);
    }

    #[actix_web::test]
    async fn test_submit_attempt_rejects_inconsistent_counts() {
        let mut attempts = MockAttemptRepository::new();
        attempts.expect_create().never();
        let app = app!(state_with(
            MockUserStatsRepository::new(),
            attempts,
            MockExamRepository::new()
        ));

        let req = test::TestRequest::post()
            .uri("/api/attempts")
            .insert_header(bearer("uid-1"))
            .set_json(serde_json::json!({
                "exam_id": "net101",
                "score": 80,
                "correct_count": 12,
                "total_questions": 10
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_provision_returns_existing_stats_untouched() {
        let existing = UserStats::empty("uid-1").with_attempt(
            &AttemptOutcome {
                attempt_id: "a1".to_string(),
                exam_id: "net101".to_string(),
                score: 90,
                correct_count: 9,
                wrong_count: 1,
                total_questions: 10,
            },
            Utc::now(),
        );
        let mut stats = MockUserStatsRepository::new();
        stats
            .expect_find_by_user_id()
            .returning(move |_| Ok(Some(existing.clone())));
        stats.expect_insert_new().never();

        let app = app!(state_with(
            stats,
            MockAttemptRepository::new(),
            MockExamRepository::new()
        ));

        let req = test::TestRequest::post()
            .uri("/api/stats/provision")
            .insert_header(bearer("uid-1"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_exams"], 1);
        assert_eq!(body["total_correct"], 9);
    }
}
