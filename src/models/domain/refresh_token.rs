use chrono::{DateTime, Duration, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a refresh-token record.
///
/// `Active`: the current value is unexpired. `GraceActive`: only the
/// superseded value is still presentable. `Dead`: neither value is valid;
/// only a fresh issue (register or login) leaves this state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    Active,
    GraceActive,
    Dead,
}

/// Per-user refresh token record. Token values are random UUIDs handed to
/// the client exactly once; only SHA-256 hashes are stored.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RefreshToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_token_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Creates an Active record with no previous value. Returns the record
    /// and the clear-text token value; the value is not recoverable from
    /// the record afterwards.
    pub fn issue(user_id: &str, lifetime: Duration) -> (Self, String) {
        let value = Uuid::new_v4().to_string();
        let record = Self {
            id: Some(ObjectId::new()),
            user_id: user_id.to_string(),
            token_hash: hash_token(&value),
            expires_at: Utc::now() + lifetime,
            previous_token_hash: None,
            previous_expires_at: None,
            created_at: Utc::now(),
        };
        (record, value)
    }

    /// FindValid predicate: the presented value matches the current hash
    /// before its expiry, or the previous hash before the grace expiry.
    /// Both comparisons are strict; a token expired exactly now is invalid.
    pub fn matches(&self, presented: &str, now: DateTime<Utc>) -> bool {
        let hash = hash_token(presented);

        if hash == self.token_hash && self.expires_at > now {
            return true;
        }

        match (&self.previous_token_hash, self.previous_expires_at) {
            (Some(prev), Some(prev_exp)) => *prev == hash && prev_exp > now,
            _ => false,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.expires_at > now {
            return TokenState::Active;
        }
        if let (Some(_), Some(prev_exp)) = (&self.previous_token_hash, self.previous_expires_at) {
            if prev_exp > now {
                return TokenState::GraceActive;
            }
        }
        TokenState::Dead
    }

    /// Supersedes the current value in place: the current hash moves into
    /// the previous slot with a short grace expiry, and a fresh random
    /// value takes over with the full lifetime. Applied on both match
    /// paths, so a rotated-out value can be presented at most once.
    /// Returns the new clear-text value.
    pub fn rotate(&mut self, lifetime: Duration, grace: Duration) -> String {
        let now = Utc::now();

        self.previous_token_hash = Some(self.token_hash.clone());
        self.previous_expires_at = Some(now + grace);

        let value = Uuid::new_v4().to_string();
        self.token_hash = hash_token(&value);
        self.expires_at = now + lifetime;

        value
    }
}

pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
