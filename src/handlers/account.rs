use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::validate_optional;
use crate::middlewares::AuthUser;
use crate::models::{UpdateSettings, UpdateUser, UserResponse, UserSettings};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
}

/// Profile page data
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub member_since: time::OffsetDateTime,
    pub collections_count: u64,
    pub settings: UserSettings,
}

/// Profile with the number of tracked collections
#[utoipa::path(
    get,
    path = "/api/users/me/profile",
    responses(
        (status = 200, description = "Profile of the current user", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let account = state.users.find_by_id(user.id).await?;
    let collections_count = state.collections.count_by_owner(user.id).await?;

    Ok(Json(ProfileResponse {
        id: account.id,
        email: account.email,
        name: account.name,
        member_since: account.created_at,
        collections_count,
        settings: account.settings,
    }))
}

/// Update the current user's display name
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_me(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let name = payload.name.map(|n| n.trim().to_string());
    validate_optional(&name, "Name", 100)?;
    if matches!(name.as_deref(), Some("")) {
        return Err(AppError::Validation(
            "Name must not be empty".to_string(),
        ));
    }

    let updated = state
        .users
        .update_profile(user.id, &UpdateUser { name })
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    get,
    path = "/api/users/me/settings",
    responses(
        (status = 200, description = "Current preferences", body = UserSettings),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_settings(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserSettings>> {
    let account = state.users.find_by_id(user.id).await?;
    Ok(Json(account.settings))
}

/// Merge a partial preferences update
#[utoipa::path(
    put,
    path = "/api/users/me/settings",
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Preferences after the update", body = UserSettings),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_settings(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettings>,
) -> AppResult<Json<UserSettings>> {
    let settings = state.users.update_settings(user.id, &payload).await?;
    tracing::debug!(user_id = %user.id, "Updated account settings");
    Ok(Json(settings))
}
