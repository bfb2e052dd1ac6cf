use secrecy::{ExposeSecret, SecretString};
use std::env;

use crate::errors::{AppError, AppResult};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub grace_window_minutes: i64,
    pub login_delay_min_ms: u64,
    pub login_delay_max_ms: u64,
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// There is deliberately no default for `JWT_SECRET`: a missing or short
    /// signing key aborts startup instead of silently signing with a
    /// placeholder.
    pub fn from_env() -> AppResult<Self> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            AppError::InternalError("JWT_SECRET environment variable is not set".to_string())
        })?;
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({} bytes). Must be at least {} bytes.",
                jwt_secret.len(),
                MIN_SECRET_LENGTH
            )));
        }

        Ok(Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "quiz-identity-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(jwt_secret),
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "quiz-identity".to_string()),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "quiz-identity".to_string()),
            access_token_minutes: env::var("ACCESS_TOKEN_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(60),
            refresh_token_days: env::var("REFRESH_TOKEN_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(7),
            grace_window_minutes: env::var("GRACE_WINDOW_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(1),
            login_delay_min_ms: env::var("LOGIN_DELAY_MIN_MS")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(100),
            login_delay_max_ms: env::var("LOGIN_DELAY_MAX_MS")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(1000),
        })
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quiz-identity-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from(
                "test_jwt_secret_key_test_jwt_secret_key".to_string(),
            ),
            jwt_issuer: "quiz-identity-test".to_string(),
            jwt_audience: "quiz-identity-test".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 7,
            grace_window_minutes: 1,
            login_delay_min_ms: 100,
            login_delay_max_ms: 1000,
        }
    }
}
