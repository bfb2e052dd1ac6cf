use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const ROLE_REGULAR_USER: &str = "RegularUser";
pub const ROLE_ADMIN: &str = "Admin";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Stored lowercased; lookups normalize the same way, which makes the
    /// unique index effectively case-insensitive.
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: &str, first_name: &str, last_name: &str) -> Self {
        User {
            id: Some(ObjectId::new()),
            email: normalize_email(email),
            password_hash: password_hash.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            roles: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assign_role(&mut self, role: &str) {
        if !self.roles.iter().any(|r| r == role) {
            self.roles.push(role.to_string());
        }
    }

    /// Subject identifier used in token claims.
    pub fn id_hex(&self) -> String {
        self.id
            .as_ref()
            .map(|oid| oid.to_hex())
            .unwrap_or_else(|| self.email.clone())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
