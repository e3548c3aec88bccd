use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Column, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, UpdateSettings, UpdateUser, User, UserSettings};
use crate::repositories::UserStore;

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, input: &CreateUser, password_hash: &str) -> AppResult<User> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email.clone()),
            password_hash: Set(password_hash.to_string()),
            name: Set(input.name.clone()),
            settings: Set(UserSettings::default()),
            created_at: Set(time::OffsetDateTime::now_utc()),
            updated_at: Set(time::OffsetDateTime::now_utc()),
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("duplicate key") || e.to_string().contains("unique") {
                AppError::Conflict("Email already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        Ok(result.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        Ok(self.find_model(id).await?.into())
    }

    /// Find user by email (for login)
    async fn find_by_email(&self, email: &str) -> AppResult<User> {
        let model = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(model.into())
    }

    async fn update_profile(&self, id: Uuid, input: &UpdateUser) -> AppResult<User> {
        let model = self.find_model(id).await?;
        let mut active: ActiveModel = model.into();

        if let Some(name) = &input.name {
            active.name = Set(name.clone());
        }
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(&self.db).await?;
        Ok(result.into())
    }

    async fn update_settings(&self, id: Uuid, input: &UpdateSettings) -> AppResult<UserSettings> {
        let model = self.find_model(id).await?;
        let settings = model.settings.clone().merge(input);

        let mut active: ActiveModel = model.into();
        active.settings = Set(settings);
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(&self.db).await?;
        Ok(result.settings)
    }
}

// Conversion from SeaORM model to our domain model
impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            password_hash: m.password_hash,
            name: m.name,
            settings: m.settings,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
