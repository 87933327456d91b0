use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::authz::RolePolicy;
use shared_utils::jwt::issue_token;

use crate::models::{
    AccountInfo, AuthError, AuthResponse, LoginRequest, RegisterRequest, UserRecord,
    PROFILE_COMPLETION_ROUTE,
};
use crate::services::registration::RegistrationService;

fn map_auth_error(error: AuthError) -> AppError {
    match error {
        AuthError::Validation(errors) => AppError::Validation(errors),
        AuthError::InvalidCredentials => {
            AppError::Auth("Invalid username or password".to_string())
        }
        AuthError::Inactive => AppError::Auth("Account is inactive".to_string()),
        AuthError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn login_response(
    config: &AppConfig,
    record: &UserRecord,
    redirect_to: String,
) -> Result<AuthResponse, AppError> {
    let access_token = issue_token(
        record.id,
        &record.email,
        record.role,
        &config.jwt_secret,
        config.token_ttl_hours,
    )
    .map_err(AppError::Internal)?;

    Ok(AuthResponse {
        access_token,
        user: AccountInfo::from(record),
        redirect_to,
    })
}

/// Patient self-registration. On success the caller is logged in
/// immediately and routed to profile completion.
#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Registering new patient account");

    let service = RegistrationService::new(&config);
    let record = service
        .register_patient(request)
        .await
        .map_err(map_auth_error)?;

    let response = login_response(&config, &record, PROFILE_COMPLETION_ROUTE.to_string())?;

    Ok(Json(json!({
        "success": true,
        "auth": response,
        "message": "Account created. Complete your profile to start booking."
    })))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = RegistrationService::new(&config);
    let record = service.authenticate(&request).await.map_err(map_auth_error)?;

    let response = login_response(&config, &record, record.role.landing_route().to_string())?;

    Ok(Json(json!({
        "success": true,
        "auth": response
    })))
}

/// Admin-only doctor account creation; the new account is active by
/// default and does not get an auto-login token.
#[axum::debug_handler]
pub async fn register_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::ADMIN_ONLY.authorize(Some(&user))?;

    let service = RegistrationService::new(&config);
    let record = service
        .register_doctor(request)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(json!({
        "success": true,
        "user": AccountInfo::from(&record),
        "message": "Doctor account created."
    })))
}

/// Role dispatch: one table, consulted here and by every guard denial.
#[axum::debug_handler]
pub async fn home(Extension(user): Extension<User>) -> Result<Json<Value>, AppError> {
    let role = RolePolicy::ANY_ROLE.authorize(Some(&user))?;

    Ok(Json(json!({
        "role": role,
        "redirect_to": role.landing_route()
    })))
}
