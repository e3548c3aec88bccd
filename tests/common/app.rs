use axum_test::TestServer;
use notedrop::build_router;
use notedrop::config::Config;
use notedrop::repositories::InMemoryStore;
use notedrop::state::AppState;

/// Test configuration; no database is contacted
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-jwt-secret-that-is-at-least-32-characters-long".to_string(),
        jwt_expiration_hours: 24,
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origin: None,
    }
}

/// Test application wrapper
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    /// Same store the router reads from, for seeding historical records
    pub store: InMemoryStore,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = InMemoryStore::new();
        let state = AppState::with_store(test_config(), store.clone());

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            state,
            store,
        }
    }
}
