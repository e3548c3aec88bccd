pub mod account;
pub mod auth;
pub mod collection;
pub mod common;
pub mod dashboard;
pub mod statistics;

pub use account::{
    get_profile, get_settings, update_me, update_settings, ProfileResponse, UpdateUserRequest,
};
pub use auth::{login, me, register, AuthResponse, LoginRequest, RegisterRequest};
pub use collection::{
    create_collection, delete_collection, get_collection, list_collections, update_collection,
    BackersInput, CollectionListResponse, CollectionResponse, CreateCollectionRequest,
    UpdateCollectionRequest,
};
pub use common::{parse_param, validate_cost, validate_optional, validate_required};
pub use dashboard::{get_activity, get_dashboard, ActivityItem, DashboardResponse, StageCounts};
pub use statistics::{export_statistics, get_charts, get_statistics, ChartsResponse};
