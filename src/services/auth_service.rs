use std::sync::Arc;

use chrono::Duration;
use validator::Validate;

use crate::{
    auth::{hash_password, verify_password, TokenIssuer},
    errors::{AppError, AppResult},
    models::{
        domain::{RefreshToken, RoleProfile, User},
        dto::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse},
    },
    repositories::{RefreshTokenRepository, RoleProfileRepository, UserRepository},
    services::delay::FailureDelay,
};

/// Composes registration, login and refresh over the user store, the
/// refresh-token store and the access-token issuer. The only component
/// exposed at the service boundary.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    role_profiles: Arc<dyn RoleProfileRepository>,
    token_issuer: Arc<TokenIssuer>,
    failure_delay: Arc<dyn FailureDelay>,
    refresh_lifetime: Duration,
    grace_window: Duration,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        role_profiles: Arc<dyn RoleProfileRepository>,
        token_issuer: Arc<TokenIssuer>,
        failure_delay: Arc<dyn FailureDelay>,
        refresh_token_days: i64,
        grace_window_minutes: i64,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            role_profiles,
            token_issuer,
            failure_delay,
            refresh_lifetime: Duration::days(refresh_token_days),
            grace_window: Duration::minutes(grace_window_minutes),
        }
    }

    pub async fn register(&self, request: RegisterRequest, role: &str) -> AppResult<TokenResponse> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            log::warn!(
                "Registration failed, email {} already registered",
                request.email
            );
            return Err(AppError::FieldValidation {
                field: "Email".to_string(),
                message: "Email already registered!".to_string(),
            });
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(
            &request.email,
            &password_hash,
            &request.first_name,
            &request.last_name,
        );

        let mut user = self.users.create(user).await?;
        user.assign_role(role);
        self.users.update(&user).await?;

        self.role_profiles
            .create(RoleProfile::new(&user.id_hex(), role))
            .await?;

        let (record, refresh_value) = RefreshToken::issue(&user.id_hex(), self.refresh_lifetime);
        self.refresh_tokens.replace_for_user(record).await?;

        let access_token = self.token_issuer.issue_for(&user)?;

        log::info!("Registered user {} with role {}", user.email, role);

        Ok(TokenResponse {
            access_token,
            refresh_token: refresh_value,
            first_name: user.first_name,
            last_name: user.last_name,
            role_names: Some(user.roles),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        request.validate()?;

        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                log::warn!("Login failed, email {} not found", request.email);
                return self.masked_failure().await;
            }
        };

        match verify_password(&request.password, &user.password_hash) {
            Ok(true) => {}
            _ => {
                log::warn!("Login failed, password problem for user {}", user.email);
                return self.masked_failure().await;
            }
        }

        let (record, refresh_value) = RefreshToken::issue(&user.id_hex(), self.refresh_lifetime);
        self.refresh_tokens.replace_for_user(record).await?;

        let access_token = self.token_issuer.issue_for(&user)?;

        Ok(TokenResponse {
            access_token,
            refresh_token: refresh_value,
            first_name: user.first_name,
            last_name: user.last_name,
            role_names: Some(user.roles),
        })
    }

    pub async fn refresh(&self, request: RefreshRequest) -> AppResult<TokenResponse> {
        // The access token is about to be replaced, so only its email claim
        // is read; the refresh token is the credential being checked.
        let email = self.token_issuer.peek_email(&request.access_token)?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                log::warn!("Refresh failed, no user for email {}", email);
                return self.masked_failure().await;
            }
        };

        let mut matching = self
            .refresh_tokens
            .find_matching(&user.id_hex(), &request.refresh_token)
            .await?;

        let mut record = match matching.len() {
            0 => return Err(AppError::NoValidToken),
            1 => matching.remove(0),
            _ => return Err(AppError::AmbiguousTokenState),
        };

        // Rotation is committed as a compare-and-swap on the hash observed
        // here. A concurrent refresh that commits first turns this into a
        // ConcurrencyConflict for the caller to retry; no internal retry,
        // as a second read would consume the grace acceptance.
        let observed_hash = record.token_hash.clone();
        let refresh_value = record.rotate(self.refresh_lifetime, self.grace_window);
        self.refresh_tokens
            .commit_rotation(&record, &observed_hash)
            .await?;

        let access_token = self.token_issuer.issue_for(&user)?;

        Ok(TokenResponse {
            access_token,
            refresh_token: refresh_value,
            first_name: user.first_name,
            last_name: user.last_name,
            role_names: None,
        })
    }

    /// Single exit point for every credential-failure branch: same delay,
    /// same error, no detail about which check failed.
    async fn masked_failure(&self) -> AppResult<TokenResponse> {
        self.failure_delay.delay().await;
        Err(AppError::AuthenticationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        models::domain::user::ROLE_REGULAR_USER,
        repositories::{
            refresh_token_repository::MockRefreshTokenRepository,
            role_profile_repository::MockRoleProfileRepository,
            user_repository::MockUserRepository,
        },
        test_utils::fixtures,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic stand-in for the random delay; records invocations.
    struct CountingDelay(AtomicUsize);

    #[async_trait]
    impl FailureDelay for CountingDelay {
        async fn delay(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn token_issuer() -> Arc<TokenIssuer> {
        let config = Config::test_config();
        Arc::new(
            TokenIssuer::new(
                &config.jwt_secret,
                &config.jwt_issuer,
                &config.jwt_audience,
                config.access_token_minutes,
            )
            .unwrap(),
        )
    }

    fn service_with(
        users: MockUserRepository,
        refresh_tokens: MockRefreshTokenRepository,
        role_profiles: MockRoleProfileRepository,
    ) -> (AuthService, Arc<CountingDelay>) {
        let delay = Arc::new(CountingDelay(AtomicUsize::new(0)));
        let service = AuthService::new(
            Arc::new(users),
            Arc::new(refresh_tokens),
            Arc::new(role_profiles),
            token_issuer(),
            delay.clone(),
            7,
            1,
        );
        (service, delay)
    }

    fn stored_user(password: &str) -> User {
        let hash = hash_password(password).unwrap();
        let mut user = User::new("john@example.com", &hash, "John", "Doe");
        user.assign_role(ROLE_REGULAR_USER);
        user
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_masked_and_delayed() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let (service, delay) = service_with(
            users,
            MockRefreshTokenRepository::new(),
            MockRoleProfileRepository::new(),
        );

        let result = service
            .login(fixtures::login_request("ghost@example.com", "Secret123$"))
            .await;

        assert!(matches!(result, Err(AppError::AuthenticationError)));
        assert_eq!(delay.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_indistinguishable_from_unknown_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("Right123$"))));

        let (service, delay) = service_with(
            users,
            MockRefreshTokenRepository::new(),
            MockRoleProfileRepository::new(),
        );

        let result = service
            .login(fixtures::login_request("john@example.com", "Wrong123$"))
            .await;

        // Same variant, same message, same delay behavior as the
        // unknown-email case.
        assert!(matches!(result, Err(AppError::AuthenticationError)));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Username / password problem"
        );
        assert_eq!(delay.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_names_the_field() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("Secret123$"))));

        let (service, delay) = service_with(
            users,
            MockRefreshTokenRepository::new(),
            MockRoleProfileRepository::new(),
        );

        let result = service
            .register(
                fixtures::register_request("john@example.com"),
                ROLE_REGULAR_USER,
            )
            .await;

        match result {
            Err(AppError::FieldValidation { field, message }) => {
                assert_eq!(field, "Email");
                assert_eq!(message, "Email already registered!");
            }
            other => panic!("Expected field validation error, got {:?}", other),
        }
        // Duplicate registration is not a credential failure; no jitter.
        assert_eq!(delay.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_unknown_user_is_masked_and_delayed() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let (service, delay) = service_with(
            users,
            MockRefreshTokenRepository::new(),
            MockRoleProfileRepository::new(),
        );

        // Token minted for a user that is absent from the store.
        let ghost = stored_user("Secret123$");
        let access_token = token_issuer().issue_for(&ghost).unwrap();

        let result = service
            .refresh(RefreshRequest {
                access_token,
                refresh_token: "whatever".to_string(),
            })
            .await;

        // Same masked variant and the same jitter as the login branches.
        assert!(matches!(result, Err(AppError::AuthenticationError)));
        assert_eq!(delay.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_with_no_matching_record() {
        let user = stored_user("Secret123$");
        let access_token = token_issuer().issue_for(&user).unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let mut refresh_tokens = MockRefreshTokenRepository::new();
        refresh_tokens
            .expect_find_matching()
            .returning(|_, _| Ok(Vec::new()));

        let (service, _) =
            service_with(users, refresh_tokens, MockRoleProfileRepository::new());

        let result = service
            .refresh(RefreshRequest {
                access_token,
                refresh_token: "never-issued".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::NoValidToken)));
    }

    #[tokio::test]
    async fn test_refresh_with_ambiguous_record_set() {
        let user = stored_user("Secret123$");
        let user_id = user.id_hex();
        let access_token = token_issuer().issue_for(&user).unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let mut refresh_tokens = MockRefreshTokenRepository::new();
        refresh_tokens.expect_find_matching().returning(move |_, _| {
            let (a, _) = RefreshToken::issue(&user_id, Duration::days(7));
            let (b, _) = RefreshToken::issue(&user_id, Duration::days(7));
            Ok(vec![a, b])
        });

        let (service, _) =
            service_with(users, refresh_tokens, MockRoleProfileRepository::new());

        let result = service
            .refresh(RefreshRequest {
                access_token,
                refresh_token: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::AmbiguousTokenState)));
    }

    #[tokio::test]
    async fn test_refresh_with_garbage_access_token() {
        let (service, _) = service_with(
            MockUserRepository::new(),
            MockRefreshTokenRepository::new(),
            MockRoleProfileRepository::new(),
        );

        let result = service
            .refresh(RefreshRequest {
                access_token: "not-a-jwt".to_string(),
                refresh_token: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::MalformedToken(_))));
    }

    #[tokio::test]
    async fn test_refresh_surfaces_lost_race_without_retry() {
        let user = stored_user("Secret123$");
        let user_id = user.id_hex();
        let access_token = token_issuer().issue_for(&user).unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let mut refresh_tokens = MockRefreshTokenRepository::new();
        refresh_tokens.expect_find_matching().returning(move |_, _| {
            let (record, _) = RefreshToken::issue(&user_id, Duration::days(7));
            Ok(vec![record])
        });
        refresh_tokens
            .expect_commit_rotation()
            .times(1)
            .returning(|_, _| Err(AppError::ConcurrencyConflict));

        let (service, _) =
            service_with(users, refresh_tokens, MockRoleProfileRepository::new());

        let result = service
            .refresh(RefreshRequest {
                access_token,
                refresh_token: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::ConcurrencyConflict)));
    }
}
