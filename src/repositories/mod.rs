pub mod collection;
pub mod memory;
pub mod user;

pub use collection::CollectionRepository;
pub use memory::InMemoryStore;
pub use user::UserRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Collection, CollectionFilter, CreateCollection, CreateUser, UpdateCollection, UpdateSettings,
    UpdateUser, User, UserSettings,
};

/// Storage backend for airdrop collections.
///
/// Every operation is scoped by the owner id; a record owned by someone else
/// is reported as `NotFound`, exactly like a missing one.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// List the owner's collections matching the filter, in the filter's order
    async fn list_by_owner(&self, owner: Uuid, filter: &CollectionFilter)
        -> AppResult<Vec<Collection>>;

    /// Count all collections owned by the user
    async fn count_by_owner(&self, owner: Uuid) -> AppResult<u64>;

    async fn get_by_id(&self, id: Uuid, owner: Uuid) -> AppResult<Collection>;

    async fn insert(&self, owner: Uuid, input: &CreateCollection) -> AppResult<Collection>;

    /// Overwrite the editable fields and refresh `updated_at`.
    ///
    /// Returns `Conflict` when `expected_updated_at` is set and no longer matches.
    async fn update(&self, id: Uuid, owner: Uuid, input: &UpdateCollection)
        -> AppResult<Collection>;

    async fn delete(&self, id: Uuid, owner: Uuid) -> AppResult<()>;
}

/// Storage backend for accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; `Conflict` when the email is taken
    async fn create(&self, input: &CreateUser, password_hash: &str) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<User>;

    async fn update_profile(&self, id: Uuid, input: &UpdateUser) -> AppResult<User>;

    /// Merge a partial settings update into the stored preferences
    async fn update_settings(&self, id: Uuid, input: &UpdateSettings) -> AppResult<UserSettings>;
}
