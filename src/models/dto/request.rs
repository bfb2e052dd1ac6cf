use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    // Length is checked here; character-class strength rules live next to
    // the hashing code in auth::password.
    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rejects_bad_email() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "Secret123$".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_short_password() {
        let request = RegisterRequest {
            email: "a@x.com".to_string(),
            password: "Ab1".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_accepts_valid_input() {
        let request = RegisterRequest {
            email: "a@x.com".to_string(),
            password: "Secret123$".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_refresh_request_field_names_are_camel_case() {
        let body = r#"{"accessToken": "aaa", "refreshToken": "bbb"}"#;
        let request: RefreshRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.access_token, "aaa");
        assert_eq!(request.refresh_token, "bbb");
    }
}
