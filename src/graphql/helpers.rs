use async_graphql::Context;

use crate::auth::Principal;

/// Principal attached to the GraphQL request, if the bearer token checked out.
pub fn principal_from_context<'a>(ctx: &'a Context<'_>) -> Option<&'a Principal> {
    ctx.data_opt::<Principal>()
}
