use std::{env, time::Duration};

use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub mongo_max_pool_size: u32,
    pub mongo_timeout_secs: u64,
    pub attempts_collection: String,
    pub user_stats_collection: String,
    pub exams_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub cors_allowed_origin: String,
    /// Optimistic write attempts inside a single aggregation call.
    pub stats_max_cas_retries: u32,
    /// Caller-side retries of a whole aggregation call after a persistence failure.
    pub stats_retry_attempts: u32,
    pub stats_retry_backoff_ms: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: env_or("MONGO_DB_NAME", "examprep-local"),
            mongo_max_pool_size: env_parse_or("MONGO_MAX_POOL_SIZE", 10),
            mongo_timeout_secs: env_parse_or("MONGO_TIMEOUT_SECS", 5),
            attempts_collection: env_or("ATTEMPTS_COLLECTION", "attempts"),
            user_stats_collection: env_or("USER_STATS_COLLECTION", "user_stats"),
            exams_collection: env_or("EXAMS_COLLECTION", "exams"),
            web_server_host: env_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env_parse_or("WEB_SERVER_PORT", 8080),
            jwt_secret: SecretString::from(env_or(
                "JWT_SECRET",
                "dev_secret_key_change_in_production",
            )),
            cors_allowed_origin: env_or("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
            stats_max_cas_retries: env_parse_or("STATS_MAX_CAS_RETRIES", 8),
            stats_retry_attempts: env_parse_or("STATS_RETRY_ATTEMPTS", 3),
            stats_retry_backoff_ms: env_parse_or("STATS_RETRY_BACKOFF_MS", 100),
        }
    }

    pub fn stats_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.stats_retry_backoff_ms)
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == "dev_secret_key_change_in_production" {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET to the identity provider's signing secret."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.stats_max_cas_retries == 0 {
            panic!("FATAL: STATS_MAX_CAS_RETRIES must be at least 1.");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "examprep-test".to_string(),
            mongo_max_pool_size: 4,
            mongo_timeout_secs: 1,
            attempts_collection: "attempts".to_string(),
            user_stats_collection: "user_stats".to_string(),
            exams_collection: "exams".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            cors_allowed_origin: "http://localhost:3000".to_string(),
            stats_max_cas_retries: 8,
            stats_retry_attempts: 3,
            stats_retry_backoff_ms: 0,
        }
    }
}
