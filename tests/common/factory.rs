use time::OffsetDateTime;
use uuid::Uuid;

use notedrop::models::{
    default_how_to_steps, default_requirements, Collection, CreateCollection, CreateUser, Stage,
};
use notedrop::services::AuthService;

use super::TestApp;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Authentication info for tests
#[allow(dead_code)]
pub struct TestAuth {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Factory for creating test data
pub struct Factory<'a> {
    app: &'a TestApp,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(app: &'a TestApp) -> Self {
        Self { app }
    }

    /// Create a test user and return auth info
    pub async fn create_user(&self) -> TestAuth {
        let email = format!("test-{}@example.com", Uuid::new_v4());
        self.create_user_with_email(&email).await
    }

    pub async fn create_user_with_email(&self, email: &str) -> TestAuth {
        let input = CreateUser {
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            name: "Test User".to_string(),
        };

        let password_hash = AuthService::hash_password(TEST_PASSWORD).unwrap();
        let user = self
            .app
            .state
            .users
            .create(&input, &password_hash)
            .await
            .unwrap();
        let issued = self.app.state.auth.issue_token(user.id, email).unwrap();

        TestAuth {
            user_id: user.id,
            email: email.to_string(),
            token: issued.token,
        }
    }

    pub fn collection_input(name: &str, stage: Stage, chain: &str) -> CreateCollection {
        CreateCollection {
            name: name.to_string(),
            subtitle: "Season 1".to_string(),
            description: Some("Test airdrop".to_string()),
            image_url: None,
            chain: chain.to_string(),
            cost: None,
            stage,
            backers: vec!["Paradigm".to_string()],
            requirements: default_requirements(),
            how_to_steps: default_how_to_steps(),
        }
    }

    /// Create a collection owned by `user_id`, stamped with the current time
    pub async fn create_collection(
        &self,
        user_id: Uuid,
        name: &str,
        stage: Stage,
        chain: &str,
    ) -> Collection {
        self.app
            .state
            .collections
            .insert(user_id, &Self::collection_input(name, stage, chain))
            .await
            .unwrap()
    }

    /// Create a collection with an explicit creation time
    pub async fn create_collection_at(
        &self,
        user_id: Uuid,
        stage: Stage,
        created_at: OffsetDateTime,
    ) -> Collection {
        self.app
            .store
            .insert_at(
                user_id,
                &Self::collection_input("Historical Drop", stage, "Ethereum"),
                created_at,
            )
            .await
    }
}
