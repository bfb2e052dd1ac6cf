use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::User;

/// Canonical claim set minted for a user. Derived per request from the user
/// record plus configuration; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    /// Uniqueness field: two otherwise identical claim sets still produce
    /// distinct tokens.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn for_user(user: &User, issuer: &str, audience: &str, lifetime_minutes: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::minutes(lifetime_minutes);

        Self {
            sub: user.id_hex(),
            email: user.email.clone(),
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            roles: user.roles.clone(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}
