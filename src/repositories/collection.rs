use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::collection::{
    self, ActiveModel, Column, Entity as CollectionEntity, HowToStepList, RequirementList,
};
use crate::error::{AppError, AppResult};
use crate::models::{Collection, CollectionFilter, CollectionSort, CreateCollection, UpdateCollection};
use crate::repositories::CollectionStore;

/// PostgreSQL-backed collection store
#[derive(Clone)]
pub struct CollectionRepository {
    db: DatabaseConnection,
}

impl CollectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Escape LIKE wildcards so user input matches literally
    fn like_pattern(query: &str) -> String {
        let escaped = query
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    }

    /// Active model carrying the editable fields only
    fn editable_fields(input: &CreateCollection) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            user_id: NotSet,
            name: Set(input.name.clone()),
            subtitle: Set(input.subtitle.clone()),
            description: Set(input.description.clone()),
            image_url: Set(input.image_url.clone()),
            chain: Set(input.chain.clone()),
            cost: Set(input.cost),
            stage: Set(input.stage),
            backers: Set(input.backers.clone()),
            requirements: Set(RequirementList(input.requirements.clone())),
            how_to_steps: Set(HowToStepList(input.how_to_steps.clone())),
            created_at: NotSet,
            updated_at: Set(time::OffsetDateTime::now_utc()),
        }
    }

    async fn exists_for_owner(&self, id: Uuid, owner: Uuid) -> AppResult<bool> {
        let count = CollectionEntity::find_by_id(id)
            .filter(Column::UserId.eq(owner))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl CollectionStore for CollectionRepository {
    async fn list_by_owner(
        &self,
        owner: Uuid,
        filter: &CollectionFilter,
    ) -> AppResult<Vec<Collection>> {
        let mut query = CollectionEntity::find().filter(Column::UserId.eq(owner));

        if let Some(stage) = filter.stage {
            query = query.filter(Column::Stage.eq(stage));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(Column::Name))).like(Self::like_pattern(search)),
            );
        }

        query = match filter.sort {
            CollectionSort::Newest => query.order_by_desc(Column::CreatedAt),
            CollectionSort::Oldest => query.order_by_asc(Column::CreatedAt),
            CollectionSort::Alphabetical => query
                .order_by(
                    SimpleExpr::from(Func::lower(Expr::col(Column::Name))),
                    Order::Asc,
                )
                .order_by_desc(Column::CreatedAt),
        };

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn count_by_owner(&self, owner: Uuid) -> AppResult<u64> {
        let count = CollectionEntity::find()
            .filter(Column::UserId.eq(owner))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: Uuid, owner: Uuid) -> AppResult<Collection> {
        let model = CollectionEntity::find_by_id(id)
            .filter(Column::UserId.eq(owner))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

        Ok(model.into())
    }

    async fn insert(&self, owner: Uuid, input: &CreateCollection) -> AppResult<Collection> {
        let now = time::OffsetDateTime::now_utc();

        let mut model = Self::editable_fields(input);
        model.id = Set(Uuid::new_v4());
        model.user_id = Set(owner);
        model.created_at = Set(now);
        model.updated_at = Set(now);

        let result = model.insert(&self.db).await?;
        Ok(result.into())
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        input: &UpdateCollection,
    ) -> AppResult<Collection> {
        // Single conditional UPDATE so the version check and the write are atomic
        let mut query = CollectionEntity::update_many()
            .set(Self::editable_fields(&input.fields))
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(owner));

        if let Some(expected) = input.expected_updated_at {
            query = query.filter(Column::UpdatedAt.eq(expected));
        }

        let result = query.exec(&self.db).await?;

        if result.rows_affected == 0 {
            if input.expected_updated_at.is_some() && self.exists_for_owner(id, owner).await? {
                return Err(AppError::Conflict(
                    "Collection was modified by another request".to_string(),
                ));
            }
            return Err(AppError::NotFound("Collection".to_string()));
        }

        self.get_by_id(id, owner).await
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> AppResult<()> {
        let result = CollectionEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(owner))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Collection".to_string()));
        }

        Ok(())
    }
}

// Conversion from SeaORM model to our domain model
impl From<collection::Model> for Collection {
    fn from(m: collection::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            subtitle: m.subtitle,
            description: m.description,
            image_url: m.image_url,
            chain: m.chain,
            cost: m.cost,
            stage: m.stage,
            backers: m.backers,
            requirements: m.requirements.0,
            how_to_steps: m.how_to_steps.0,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
