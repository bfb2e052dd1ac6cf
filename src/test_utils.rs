use crate::models::dto::{LoginRequest, RegisterRequest};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "Secret123$".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    pub fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use validator::Validate;

    #[test]
    fn test_register_fixture_is_valid() {
        let request = register_request("fixture@example.com");
        assert!(request.validate().is_ok());
        assert_eq!(request.email, "fixture@example.com");
    }
}
