use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
    models::domain::User,
};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime_minutes: i64,
}

/// Shape used when reading a token without trusting its signature; only the
/// email claim is of interest on the refresh path.
#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    email: Option<String>,
}

impl TokenIssuer {
    /// An absent or undersized signing key is a configuration error, not a
    /// user-facing one; callers are expected to abort startup on it.
    pub fn new(
        secret: &SecretString,
        issuer: &str,
        audience: &str,
        lifetime_minutes: i64,
    ) -> AppResult<Self> {
        let secret_bytes = secret.expose_secret().as_bytes();
        if secret_bytes.len() < MIN_SECRET_LENGTH {
            return Err(AppError::InternalError(format!(
                "JWT signing key must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH,
                secret_bytes.len()
            )));
        }

        let mut validation = Validation::default();
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            lifetime_minutes,
        })
    }

    pub fn issue_for(&self, user: &User) -> AppResult<String> {
        let claims = Claims::for_user(user, &self.issuer, &self.audience, self.lifetime_minutes);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign access token: {}", e)))
    }

    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::MalformedToken(format!("Invalid access token: {}", e)))
    }

    /// Extracts the email claim without verifying signature or expiry. Used
    /// only on the refresh path, where the presented access token is about
    /// to be replaced and the refresh token itself is the credential.
    pub fn peek_email(&self, token: &str) -> AppResult<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<UnverifiedClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::MalformedToken(format!("Cannot parse the token: {}", e)))?;

        data.claims
            .email
            .ok_or_else(|| AppError::MalformedToken("No email claim in token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, models::domain::user::ROLE_REGULAR_USER};
    use secrecy::SecretString;

    fn issuer() -> TokenIssuer {
        let config = Config::test_config();
        TokenIssuer::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            config.access_token_minutes,
        )
        .unwrap()
    }

    fn test_user() -> User {
        let mut user = User::new("john@example.com", "hash", "John", "Doe");
        user.assign_role(ROLE_REGULAR_USER);
        user
    }

    #[test]
    fn test_short_signing_key_is_rejected() {
        let secret = SecretString::from("too-short".to_string());
        let result = TokenIssuer::new(&secret, "iss", "aud", 60);
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let issuer = issuer();
        let user = test_user();

        let token = issuer.issue_for(&user).unwrap();
        assert!(!token.is_empty());

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.roles, vec![ROLE_REGULAR_USER.to_string()]);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let result = issuer().validate("invalid.token.here");
        assert!(matches!(result, Err(AppError::MalformedToken(_))));
    }

    #[test]
    fn test_peek_email_ignores_signature() {
        let config = Config::test_config();
        let issuer_a = issuer();
        let issuer_b = TokenIssuer::new(
            &SecretString::from("another_secret_key_of_sufficient_size".to_string()),
            &config.jwt_issuer,
            &config.jwt_audience,
            60,
        )
        .unwrap();

        let token = issuer_a.issue_for(&test_user()).unwrap();

        // Signed with a different key, still readable.
        let email = issuer_b.peek_email(&token).unwrap();
        assert_eq!(email, "john@example.com");
    }

    #[test]
    fn test_peek_email_rejects_unparsable_token() {
        let result = issuer().peek_email("not-a-jwt");
        assert!(matches!(result, Err(AppError::MalformedToken(_))));
    }

    #[test]
    fn test_peek_email_requires_email_claim() {
        // A token whose claims lack an email field.
        #[derive(serde::Serialize)]
        struct Bare {
            sub: String,
            exp: usize,
        }
        let config = Config::test_config();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Bare {
                sub: "user".to_string(),
                exp: 4102444800,
            },
            &EncodingKey::from_secret(config.jwt_secret_bytes()),
        )
        .unwrap();

        let result = issuer().peek_email(&token);
        assert!(matches!(result, Err(AppError::MalformedToken(_))));
    }
}
