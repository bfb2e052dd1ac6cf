use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Role-scoped marker record written once per registration, tying a user id
/// to the profile kind it was registered as ("Admin" or "RegularUser").
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoleProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl RoleProfile {
    pub fn new(user_id: &str, role: &str) -> Self {
        Self {
            id: Some(ObjectId::new()),
            user_id: user_id.to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }
}
