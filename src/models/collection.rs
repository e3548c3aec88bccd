use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle stage of an airdrop collection
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[sea_orm(string_value = "active")]
    #[serde(alias = "Active")]
    Active,
    #[sea_orm(string_value = "upcoming")]
    #[serde(alias = "Upcoming")]
    #[default]
    Upcoming,
    #[sea_orm(string_value = "ended")]
    #[serde(alias = "Ended")]
    Ended,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Active, Stage::Upcoming, Stage::Ended];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Upcoming => "upcoming",
            Self::Ended => "ended",
        }
    }

    /// Display label used in charts and exports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Upcoming => "Upcoming",
            Self::Ended => "Ended",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Active => "#22c55e",
            Self::Upcoming => "#3b82f6",
            Self::Ended => "#6b7280",
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "upcoming" => Ok(Self::Upcoming),
            "ended" => Ok(Self::Ended),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

/// A single eligibility requirement (`{ id, title }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Requirement {
    pub id: i32,
    pub title: String,
}

/// A single "how to participate" step (`{ step, title }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HowToStep {
    pub step: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub chain: String,
    pub cost: Option<Decimal>,
    pub stage: Stage,
    pub backers: Vec<String>,
    pub requirements: Vec<Requirement>,
    pub how_to_steps: Vec<HowToStep>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Editable fields of a collection, shared by create and full-overwrite update
#[derive(Debug, Clone)]
pub struct CreateCollection {
    pub name: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub chain: String,
    pub cost: Option<Decimal>,
    pub stage: Stage,
    pub backers: Vec<String>,
    pub requirements: Vec<Requirement>,
    pub how_to_steps: Vec<HowToStep>,
}

#[derive(Debug, Clone)]
pub struct UpdateCollection {
    pub fields: CreateCollection,
    /// When set, the update only applies if the stored `updated_at` still matches
    pub expected_updated_at: Option<OffsetDateTime>,
}

/// Blank requirement slots offered by the create form
pub fn default_requirements() -> Vec<Requirement> {
    (1..=4)
        .map(|id| Requirement {
            id,
            title: String::new(),
        })
        .collect()
}

/// Blank how-to steps offered by the create form
pub fn default_how_to_steps() -> Vec<HowToStep> {
    (1..=5)
        .map(|step| HowToStep {
            step,
            title: String::new(),
        })
        .collect()
}

/// Ordering applied to collection listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollectionSort {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    /// Case-insensitive substring match on the name
    pub search: Option<String>,
    pub stage: Option<Stage>,
    pub sort: CollectionSort,
    pub limit: Option<u64>,
}

impl CollectionFilter {
    pub fn matches(&self, collection: &Collection) -> bool {
        if let Some(stage) = self.stage {
            if collection.stage != stage {
                return false;
            }
        }
        match self.search.as_deref() {
            Some(query) if !query.is_empty() => collection
                .name
                .to_lowercase()
                .contains(&query.to_lowercase()),
            _ => true,
        }
    }

    /// Sort in place using this filter's ordering
    pub fn sort(&self, collections: &mut [Collection]) {
        match self.sort {
            CollectionSort::Newest => collections.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            CollectionSort::Oldest => collections.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            CollectionSort::Alphabetical => collections.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
    }
}
