pub mod graphql_handler;
pub mod health_handler;
pub mod stats_handler;

use actix_web::web;

pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use stats_handler::{
    get_my_stats, get_recent_attempts, provision_stats, replay_attempts, submit_attempt,
};

pub fn configure(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(graphql)
        .service(graphiql)
        .service(get_my_stats)
        .service(get_recent_attempts)
        .service(submit_attempt)
        .service(provision_stats)
        .service(replay_attempts);
}
