use std::sync::Arc;

use crate::{
    auth::TokenIssuer,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoRefreshTokenRepository, MongoRoleProfileRepository, MongoUserRepository,
        RefreshTokenRepository, RoleProfileRepository, UserRepository,
    },
    services::{AuthService, RandomDelay},
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub users: Arc<dyn UserRepository>,
    pub token_issuer: Arc<TokenIssuer>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;

        let refresh_tokens: Arc<dyn RefreshTokenRepository> =
            Arc::new(MongoRefreshTokenRepository::new(&db));
        refresh_tokens.ensure_indexes().await?;

        let role_profiles: Arc<dyn RoleProfileRepository> =
            Arc::new(MongoRoleProfileRepository::new(&db));
        role_profiles.ensure_indexes().await?;

        let token_issuer = Arc::new(TokenIssuer::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            config.access_token_minutes,
        )?);

        let failure_delay = Arc::new(RandomDelay::new(
            config.login_delay_min_ms,
            config.login_delay_max_ms,
        ));

        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            refresh_tokens,
            role_profiles,
            token_issuer.clone(),
            failure_delay,
            config.refresh_token_days,
            config.grace_window_minutes,
        ));

        Ok(Self {
            auth_service,
            users,
            token_issuer,
            config: Arc::new(config),
            db,
        })
    }
}
