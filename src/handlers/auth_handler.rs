use std::sync::Arc;

use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::{
        domain::user::{ROLE_ADMIN, ROLE_REGULAR_USER},
        dto::{LoginRequest, RefreshRequest, RegisterRequest, UserProfileResponse},
    },
};

#[post("/register")]
pub async fn register(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .register(request.into_inner(), ROLE_REGULAR_USER)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/register-admin")]
pub async fn register_admin(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .auth_service
        .register(request.into_inner(), ROLE_ADMIN)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/login")]
pub async fn login(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/refresh")]
pub async fn refresh(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.refresh(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Authenticated profile lookup; runs behind the bearer-token middleware.
pub async fn me(
    state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let found = state
        .users
        .find_by_id(&user.0.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserProfileResponse::from(found)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::assert_error_status;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_register_endpoint_requires_app_state() {
        let app = test::init_service(App::new().service(register)).await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(serde_json::json!({
                "email": "a@x.com",
                "password": "Secret123$",
                "firstName": "A",
                "lastName": "B",
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        // No AppState wired in, so the endpoint must fail rather than 200.
        assert_error_status(resp.status());
    }

    #[actix_web::test]
    async fn test_login_endpoint_rejects_non_json_body() {
        let app = test::init_service(App::new().service(login)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_payload("not json")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_error_status(resp.status());
    }
}
