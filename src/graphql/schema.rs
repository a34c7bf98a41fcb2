use async_graphql::{Context, EmptySubscription, Object, Schema as GraphQLSchema};

use crate::{
    app_state::AppState,
    auth::require_principal,
    errors::AppResult,
    graphql::helpers::principal_from_context,
    models::dto::{
        request::SubmitQuizResultInput,
        response::{ExamDto, RecentActivityDto, SubmitQuizResultResponse, UserStatsDto},
    },
    services::ReplayReport,
};

pub type Schema = GraphQLSchema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn my_stats(&self, ctx: &Context<'_>) -> AppResult<Option<UserStatsDto>> {
        let state = ctx.data::<AppState>()?;
        let principal = require_principal(principal_from_context(ctx))?;

        let stats = state
            .reader_service
            .get_user_stats(Some(principal), &principal.user_id)
            .await?;
        Ok(stats.map(UserStatsDto::from))
    }

    async fn recent_activity(
        &self,
        ctx: &Context<'_>,
        limit: Option<i64>,
    ) -> AppResult<Vec<RecentActivityDto>> {
        let state = ctx.data::<AppState>()?;
        let principal = require_principal(principal_from_context(ctx))?;

        state
            .reader_service
            .get_recent_activity(Some(principal), &principal.user_id, limit)
            .await
    }

    async fn exams_by_slugs(&self, ctx: &Context<'_>, slugs: Vec<String>) -> AppResult<Vec<ExamDto>> {
        let state = ctx.data::<AppState>()?;
        require_principal(principal_from_context(ctx))?;

        let exams = state.reader_service.find_exams_by_slugs(&slugs).await?;
        Ok(exams.into_iter().map(ExamDto::from).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn submit_quiz_result(
        &self,
        ctx: &Context<'_>,
        input: SubmitQuizResultInput,
    ) -> AppResult<SubmitQuizResultResponse> {
        let state = ctx.data::<AppState>()?;

        let outcome = state
            .submission_service
            .submit_quiz_result(principal_from_context(ctx), &input)
            .await?;
        Ok(outcome.into())
    }

    async fn provision_stats(&self, ctx: &Context<'_>) -> AppResult<UserStatsDto> {
        let state = ctx.data::<AppState>()?;

        let stats = state
            .aggregator_service
            .ensure_user_stats(principal_from_context(ctx))
            .await?;
        Ok(stats.into())
    }

    async fn replay_attempts(&self, ctx: &Context<'_>) -> AppResult<ReplayReport> {
        let state = ctx.data::<AppState>()?;

        state
            .submission_service
            .replay_attempts(principal_from_context(ctx))
            .await
    }
}

pub fn create_schema(app_state: AppState) -> Schema {
    GraphQLSchema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(app_state)
        .finish()
}
