use serde::Serialize;

/// Payload returned by Register, Login and Refresh. Refresh leaves
/// `roleNames` out of the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_names: Option<Vec<String>>,
}

/// Body of the authenticated profile endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_names: Vec<String>,
}

impl From<crate::models::domain::User> for UserProfileResponse {
    fn from(user: crate::models::domain::User) -> Self {
        Self {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role_names: user.roles,
        }
    }
}
