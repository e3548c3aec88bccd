use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::validate_required;
use crate::middlewares::AuthUser;
use crate::models::{CreateUser, User, UserResponse};
use crate::services::AuthService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub expires_at: time::OffsetDateTime,
    pub user: UserResponse,
}

impl AuthResponse {
    fn issue(state: &AppState, user: User) -> AppResult<Self> {
        let issued = state.auth.issue_token(user.id, &user.email)?;
        Ok(Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.into(),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============ Handlers ============

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 409, description = "Email already exists"),
        (status = 400, description = "Validation error")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);
    validate_required(&email, "Email", 255)?;
    if !email.contains('@') {
        return Err(AppError::Validation("Email is invalid".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    validate_required(&payload.name, "Name", 100)?;

    let password_hash = AuthService::hash_password(&payload.password)?;

    let create_user = CreateUser {
        email,
        password: payload.password,
        name: payload.name.trim().to_string(),
    };
    let user = state.users.create(&create_user, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Registered new account");

    Ok((StatusCode::CREATED, Json(AuthResponse::issue(&state, user)?)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Unknown email and wrong password look the same to the caller
    let user = state
        .users
        .find_by_email(&normalize_email(&payload.email))
        .await
        .map_err(|_| AppError::InvalidCredentials)?;

    if !AuthService::verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Rejected login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(AuthResponse::issue(&state, user)?))
}

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user info", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserResponse>> {
    let user_data = state.users.find_by_id(user.id).await?;
    Ok(Json(user_data.into()))
}
