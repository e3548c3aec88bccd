use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{parse_param, validate_cost, validate_optional, validate_required};
use crate::middlewares::AuthUser;
use crate::models::{
    default_how_to_steps, default_requirements, Collection, CollectionFilter, CollectionSort,
    CreateCollection, HowToStep, Requirement, Stage, UpdateCollection,
};
use crate::state::AppState;

// ============ Request/Response DTOs ============

/// Backers given either as a list or as one comma-separated string
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum BackersInput {
    List(Vec<String>),
    Csv(String),
}

impl BackersInput {
    /// Trimmed entries, blanks dropped
    pub fn into_list(self) -> Vec<String> {
        let raw = match self {
            Self::List(items) => items,
            Self::Csv(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub chain: String,
    #[schema(value_type = Option<f64>)]
    pub cost: Option<Decimal>,
    /// Defaults to `upcoming`
    pub stage: Option<Stage>,
    pub backers: Option<BackersInput>,
    /// Defaults to four blank requirements
    pub requirements: Option<Vec<Requirement>>,
    /// Defaults to five blank steps
    pub how_to_steps: Option<Vec<HowToStep>>,
}

/// Full overwrite of the editable fields
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCollectionRequest {
    pub name: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub chain: String,
    #[schema(value_type = Option<f64>)]
    pub cost: Option<Decimal>,
    pub stage: Stage,
    pub backers: Option<BackersInput>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub how_to_steps: Vec<HowToStep>,
    /// `updated_at` the client last saw; the update fails with 409 if the record moved on
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>)]
    pub expected_updated_at: Option<time::OffsetDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionResponse {
    pub id: Uuid,
    pub name: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub chain: String,
    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,
    pub stage: Stage,
    pub backers: Vec<String>,
    pub requirements: Vec<Requirement>,
    pub how_to_steps: Vec<HowToStep>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Collection> for CollectionResponse {
    fn from(c: Collection) -> Self {
        Self {
            id: c.id,
            name: c.name,
            subtitle: c.subtitle,
            description: c.description,
            image_url: c.image_url,
            chain: c.chain,
            cost: c.cost,
            stage: c.stage,
            backers: c.backers,
            requirements: c.requirements,
            how_to_steps: c.how_to_steps,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionListResponse {
    pub data: Vec<CollectionResponse>,
    pub total: u64,
}

impl From<Vec<Collection>> for CollectionListResponse {
    fn from(collections: Vec<Collection>) -> Self {
        Self {
            total: collections.len() as u64,
            data: collections.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCollectionsParams {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    /// `active`, `upcoming`, `ended` or `all`
    pub stage: Option<String>,
    pub sort: Option<CollectionSort>,
    #[param(minimum = 1, maximum = 500)]
    pub limit: Option<u64>,
}

/// Stage filter where `all` (or nothing) means no filter
pub(crate) fn stage_filter(value: Option<&str>) -> AppResult<Option<Stage>> {
    match value {
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        other => parse_param(other, "stage"),
    }
}

fn validate_fields(
    name: &str,
    subtitle: &str,
    chain: &str,
    description: &Option<String>,
    image_url: &Option<String>,
    cost: Option<Decimal>,
) -> AppResult<()> {
    validate_required(name, "Name", 100)?;
    validate_required(subtitle, "Subtitle", 200)?;
    validate_required(chain, "Chain", 50)?;
    validate_optional(description, "Description", 5000)?;
    validate_optional(image_url, "Image URL", 2048)?;
    validate_cost(cost)
}

// ============ Handlers ============

/// Create a new collection
#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created successfully", body = CollectionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 400, description = "Validation error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn create_collection(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCollectionRequest>,
) -> AppResult<(StatusCode, Json<CollectionResponse>)> {
    validate_fields(
        &payload.name,
        &payload.subtitle,
        &payload.chain,
        &payload.description,
        &payload.image_url,
        payload.cost,
    )?;

    let create_collection = CreateCollection {
        name: payload.name.trim().to_string(),
        subtitle: payload.subtitle.trim().to_string(),
        description: payload.description,
        image_url: payload.image_url,
        chain: payload.chain.trim().to_string(),
        cost: payload.cost,
        stage: payload.stage.unwrap_or_default(),
        backers: payload
            .backers
            .map(BackersInput::into_list)
            .unwrap_or_default(),
        requirements: payload.requirements.unwrap_or_else(default_requirements),
        how_to_steps: payload.how_to_steps.unwrap_or_else(default_how_to_steps),
    };

    let collection = state.collections.insert(user.id, &create_collection).await?;
    tracing::info!(collection_id = %collection.id, user_id = %user.id, "Created collection");

    Ok((StatusCode::CREATED, Json(collection.into())))
}

/// List the current user's collections
#[utoipa::path(
    get,
    path = "/api/collections",
    params(ListCollectionsParams),
    responses(
        (status = 200, description = "List of collections", body = CollectionListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn list_collections(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListCollectionsParams>,
) -> AppResult<Json<CollectionListResponse>> {
    let filter = CollectionFilter {
        search: params.search.map(|s| s.trim().to_string()),
        stage: stage_filter(params.stage.as_deref())?,
        sort: params.sort.unwrap_or_default(),
        limit: params.limit.map(|l| l.clamp(1, 500)),
    };

    let collections = state.collections.list_by_owner(user.id, &filter).await?;
    Ok(Json(collections.into()))
}

/// Get a collection by ID
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Collection details", body = CollectionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Collection not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn get_collection(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CollectionResponse>> {
    let collection = state.collections.get_by_id(id, user.id).await?;
    Ok(Json(collection.into()))
}

/// Overwrite a collection's editable fields
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated successfully", body = CollectionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Collection not found"),
        (status = 409, description = "Collection changed since expected_updated_at")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn update_collection(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> AppResult<Json<CollectionResponse>> {
    validate_fields(
        &payload.name,
        &payload.subtitle,
        &payload.chain,
        &payload.description,
        &payload.image_url,
        payload.cost,
    )?;

    let update_collection = UpdateCollection {
        fields: CreateCollection {
            name: payload.name.trim().to_string(),
            subtitle: payload.subtitle.trim().to_string(),
            description: payload.description,
            image_url: payload.image_url,
            chain: payload.chain.trim().to_string(),
            cost: payload.cost,
            stage: payload.stage,
            backers: payload
                .backers
                .map(BackersInput::into_list)
                .unwrap_or_default(),
            requirements: payload.requirements,
            how_to_steps: payload.how_to_steps,
        },
        expected_updated_at: payload.expected_updated_at,
    };

    let collection = state
        .collections
        .update(id, user.id, &update_collection)
        .await?;
    Ok(Json(collection.into()))
}

/// Delete a collection
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 204, description = "Collection deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Collection not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Collections"
)]
pub async fn delete_collection(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.collections.delete(id, user.id).await?;
    tracing::info!(collection_id = %id, user_id = %user.id, "Deleted collection");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backers_from_csv_string() {
        let input: BackersInput = serde_json::from_str("\" Paradigm, a16z ,, Coinbase \"").unwrap();
        assert_eq!(input.into_list(), vec!["Paradigm", "a16z", "Coinbase"]);
    }

    #[test]
    fn test_backers_from_list() {
        let input: BackersInput = serde_json::from_str(r#"["Paradigm", "  "]"#).unwrap();
        assert_eq!(input.into_list(), vec!["Paradigm"]);
    }

    #[test]
    fn test_stage_filter_all_means_none() {
        assert_eq!(stage_filter(Some("all")).unwrap(), None);
        assert_eq!(stage_filter(None).unwrap(), None);
        assert_eq!(stage_filter(Some("ended")).unwrap(), Some(Stage::Ended));
        assert!(stage_filter(Some("archived")).is_err());
    }
}
