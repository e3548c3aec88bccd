use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::models::{HowToStep, Requirement, Stage};

/// JSONB column holding the ordered requirement list
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RequirementList(pub Vec<Requirement>);

/// JSONB column holding the ordered how-to steps
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct HowToStepList(pub Vec<HowToStep>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "airdrop_collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub chain: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub cost: Option<Decimal>,
    pub stage: Stage,
    pub backers: Vec<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub requirements: RequirementList,
    #[sea_orm(column_type = "JsonBinary")]
    pub how_to_steps: HowToStepList,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
