use anyhow::Context;
use tracing_subscriber::EnvFilter;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use notedrop::config::Config;
use notedrop::handlers::{
    ActivityItem, AuthResponse, BackersInput, ChartsResponse, CollectionListResponse,
    CollectionResponse, CreateCollectionRequest, DashboardResponse, LoginRequest,
    ProfileResponse, RegisterRequest, StageCounts, UpdateCollectionRequest, UpdateUserRequest,
};
use notedrop::models::{
    CollectionSort, HowToStep, Requirement, Stage, Theme, UpdateSettings, UserResponse,
    UserSettings,
};
use notedrop::services::chart::{Bar, LineChart, PieChart, Point, StackedSegment, Wedge};
use notedrop::services::statistics::{
    ChainShare, GrowthSummary, MonthlyBucket, StageShare, Summary,
};
use notedrop::services::{Series, StatisticsReport, TimeRange};
use notedrop::state::AppState;
use notedrop::{build_router, handlers};

/// Security scheme for Bearer token
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::account::get_profile,
        handlers::account::update_me,
        handlers::account::get_settings,
        handlers::account::update_settings,
        handlers::collection::create_collection,
        handlers::collection::list_collections,
        handlers::collection::get_collection,
        handlers::collection::update_collection,
        handlers::collection::delete_collection,
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_activity,
        handlers::statistics::get_statistics,
        handlers::statistics::get_charts,
        handlers::statistics::export_statistics,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        UpdateUserRequest,
        ProfileResponse,
        UserSettings,
        UpdateSettings,
        Theme,
        Stage,
        Requirement,
        HowToStep,
        CollectionSort,
        BackersInput,
        CreateCollectionRequest,
        UpdateCollectionRequest,
        CollectionResponse,
        CollectionListResponse,
        StageCounts,
        DashboardResponse,
        ActivityItem,
        TimeRange,
        Series,
        MonthlyBucket,
        GrowthSummary,
        ChainShare,
        StageShare,
        Summary,
        StatisticsReport,
        Point,
        LineChart,
        Bar,
        StackedSegment,
        Wedge,
        PieChart,
        ChartsResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Profile and settings endpoints"),
        (name = "Collections", description = "Airdrop collection management endpoints"),
        (name = "Dashboard", description = "Overview and recent activity"),
        (name = "Statistics", description = "Aggregated statistics, chart geometry and exports")
    )
)]
struct ApiDoc;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notedrop=debug,tower_http=debug"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    // LOG_FORMAT=json switches to one JSON object per line
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.server_addr();

    tracing::info!("Connecting to database...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!("Database ready, migrations applied");

    let app = build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
