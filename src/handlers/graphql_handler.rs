use actix_web::{get, post, web, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{auth::OptionalPrincipal, graphql::Schema};

#[post("/graphql")]
async fn graphql(
    schema: web::Data<Schema>,
    auth: OptionalPrincipal,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let OptionalPrincipal(Some(principal)) = auth {
        request = request.data(principal);
    }
    schema.execute(request).await.into()
}

#[get("/graphiql")]
async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app_state::AppState,
        auth::{jwt::sign_test_token, Claims, JwtVerifier},
        config::Config,
        graphql::create_schema,
        models::domain::UserStats,
        repositories::{
            attempt_repository::MockAttemptRepository, exam_repository::MockExamRepository,
            user_stats_repository::MockUserStatsRepository,
        },
    };
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_bearer_token_reaches_resolvers() {
        let mut stats = MockUserStatsRepository::new();
        stats
            .expect_find_by_user_id()
            .withf(|user_id| user_id == "uid-9")
            .returning(|_| Ok(Some(UserStats::empty("uid-9"))));

        let config = Config::test_config();
        let token = sign_test_token(&config.jwt_secret, &Claims::for_subject("uid-9", 3600));
        let state = AppState::with_repositories(
            config,
            Arc::new(stats),
            Arc::new(MockAttemptRepository::new()),
            Arc::new(MockExamRepository::new()),
        );
        let verifier: Arc<JwtVerifier> = state.jwt_verifier.clone();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_schema(state)))
                .app_data(web::Data::from(verifier))
                .service(graphql),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "query": "{ myStats { userId } }" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["myStats"]["userId"], "uid-9");
    }

    #[actix_web::test]
    async fn test_graphiql_page() {
        let app = test::init_service(App::new().service(graphiql)).await;

        let req = test::TestRequest::get().uri("/graphiql").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }
}
