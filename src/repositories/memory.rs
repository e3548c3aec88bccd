use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Collection, CollectionFilter, CreateCollection, CreateUser, UpdateCollection, UpdateSettings,
    UpdateUser, User, UserSettings,
};
use crate::repositories::{CollectionStore, UserStore};

/// In-memory store for tests and local runs without PostgreSQL
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    users: HashMap<Uuid, User>,
    collections: HashMap<Uuid, Collection>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collection with an explicit creation time (seeding historical data)
    pub async fn insert_at(
        &self,
        owner: Uuid,
        input: &CreateCollection,
        created_at: OffsetDateTime,
    ) -> Collection {
        let collection = Collection {
            id: Uuid::new_v4(),
            user_id: owner,
            name: input.name.clone(),
            subtitle: input.subtitle.clone(),
            description: input.description.clone(),
            image_url: input.image_url.clone(),
            chain: input.chain.clone(),
            cost: input.cost,
            stage: input.stage,
            backers: input.backers.clone(),
            requirements: input.requirements.clone(),
            how_to_steps: input.how_to_steps.clone(),
            created_at,
            updated_at: created_at,
        };

        let mut inner = self.inner.write().await;
        inner.collections.insert(collection.id, collection.clone());
        collection
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn list_by_owner(
        &self,
        owner: Uuid,
        filter: &CollectionFilter,
    ) -> AppResult<Vec<Collection>> {
        let inner = self.inner.read().await;
        let mut items: Vec<Collection> = inner
            .collections
            .values()
            .filter(|c| c.user_id == owner && filter.matches(c))
            .cloned()
            .collect();
        drop(inner);

        filter.sort(&mut items);
        if let Some(limit) = filter.limit {
            items.truncate(limit as usize);
        }
        Ok(items)
    }

    async fn count_by_owner(&self, owner: Uuid) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .values()
            .filter(|c| c.user_id == owner)
            .count() as u64)
    }

    async fn get_by_id(&self, id: Uuid, owner: Uuid) -> AppResult<Collection> {
        let inner = self.inner.read().await;
        inner
            .collections
            .get(&id)
            .filter(|c| c.user_id == owner)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Collection".to_string()))
    }

    async fn insert(&self, owner: Uuid, input: &CreateCollection) -> AppResult<Collection> {
        Ok(self
            .insert_at(owner, input, OffsetDateTime::now_utc())
            .await)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        input: &UpdateCollection,
    ) -> AppResult<Collection> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .collections
            .get_mut(&id)
            .filter(|c| c.user_id == owner)
            .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

        if let Some(expected) = input.expected_updated_at {
            if existing.updated_at != expected {
                return Err(AppError::Conflict(
                    "Collection was modified by another request".to_string(),
                ));
            }
        }

        let fields = &input.fields;
        existing.name = fields.name.clone();
        existing.subtitle = fields.subtitle.clone();
        existing.description = fields.description.clone();
        existing.image_url = fields.image_url.clone();
        existing.chain = fields.chain.clone();
        existing.cost = fields.cost;
        existing.stage = fields.stage;
        existing.backers = fields.backers.clone();
        existing.requirements = fields.requirements.clone();
        existing.how_to_steps = fields.how_to_steps.clone();
        // Keep the version token strictly increasing even within one clock tick
        existing.updated_at =
            OffsetDateTime::now_utc().max(existing.updated_at + Duration::microseconds(1));

        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.collections.get(&id) {
            Some(c) if c.user_id == owner => {
                inner.collections.remove(&id);
                Ok(())
            }
            _ => Err(AppError::NotFound("Collection".to_string())),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create(&self, input: &CreateUser, password_hash: &str) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == input.email) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            password_hash: password_hash.to_string(),
            name: input.name.clone(),
            settings: UserSettings::default(),
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn update_profile(&self, id: Uuid, input: &UpdateUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if let Some(name) = &input.name {
            user.name = name.clone();
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn update_settings(&self, id: Uuid, input: &UpdateSettings) -> AppResult<UserSettings> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        user.settings = user.settings.clone().merge(input);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.settings.clone())
    }
}
