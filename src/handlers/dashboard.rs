use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::collection::stage_filter;
use crate::handlers::CollectionResponse;
use crate::middlewares::AuthUser;
use crate::models::{CollectionFilter, Stage};
use crate::services::statistics::{monthly_buckets, GrowthSummary};
use crate::state::AppState;

const DEFAULT_ACTIVITY_LIMIT: u64 = 20;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardParams {
    /// `active`, `upcoming`, `ended` or `all`
    pub stage: Option<String>,
}

/// Headline counts across all of the user's collections
#[derive(Debug, Serialize, ToSchema)]
pub struct StageCounts {
    pub total: u64,
    pub active: u64,
    pub upcoming: u64,
    pub ended: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub counts: StageCounts,
    /// Month-over-month change of each count for the current month
    pub growth: GrowthSummary,
    /// Newest first, narrowed to the requested stage
    pub collections: Vec<CollectionResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivityParams {
    #[param(default = 20, minimum = 1, maximum = 100)]
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityItem {
    pub id: Uuid,
    pub name: String,
    pub chain: String,
    pub stage: Stage,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

/// Dashboard overview
#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(DashboardParams),
    responses(
        (status = 200, description = "Stage counts and matching collections", body = DashboardResponse),
        (status = 400, description = "Invalid stage filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DashboardResponse>> {
    let stage = stage_filter(params.stage.as_deref())?;
    let all = state
        .collections
        .list_by_owner(user.id, &CollectionFilter::default())
        .await?;

    let count = |s: Stage| all.iter().filter(|c| c.stage == s).count() as u64;
    let counts = StageCounts {
        total: all.len() as u64,
        active: count(Stage::Active),
        upcoming: count(Stage::Upcoming),
        ended: count(Stage::Ended),
    };

    let now = OffsetDateTime::now_utc();
    let growth = GrowthSummary::for_month(&monthly_buckets(&all, now), now);

    let collections = all
        .into_iter()
        .filter(|c| stage.map_or(true, |s| c.stage == s))
        .map(Into::into)
        .collect();

    Ok(Json(DashboardResponse {
        counts,
        growth,
        collections,
    }))
}

/// Most recently added collections
#[utoipa::path(
    get,
    path = "/api/activity",
    params(ActivityParams),
    responses(
        (status = 200, description = "Recent activity, newest first", body = Vec<ActivityItem>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn get_activity(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> AppResult<Json<Vec<ActivityItem>>> {
    let filter = CollectionFilter {
        limit: Some(
            params
                .limit
                .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
                .clamp(1, 100),
        ),
        ..Default::default()
    };

    let recent = state.collections.list_by_owner(user.id, &filter).await?;
    Ok(Json(
        recent
            .into_iter()
            .map(|c| ActivityItem {
                id: c.id,
                name: c.name,
                chain: c.chain,
                stage: c.stage,
                created_at: c.created_at,
            })
            .collect(),
    ))
}
