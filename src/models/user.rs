use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // Never expose password hash
    pub password_hash: String,
    pub name: String,
    pub settings: UserSettings,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User creation DTO (without id and timestamps)
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// User update DTO
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Account preferences, stored as JSONB on the user row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(default)]
pub struct UserSettings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub mobile_notifications: bool,
    pub two_factor_auth: bool,
    pub public_profile: bool,
    pub theme: Theme,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            mobile_notifications: false,
            two_factor_auth: false,
            public_profile: true,
            theme: Theme::System,
        }
    }
}

/// Partial settings update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettings {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub mobile_notifications: Option<bool>,
    pub two_factor_auth: Option<bool>,
    pub public_profile: Option<bool>,
    pub theme: Option<Theme>,
}

impl UserSettings {
    pub fn merge(mut self, update: &UpdateSettings) -> Self {
        if let Some(v) = update.email_notifications {
            self.email_notifications = v;
        }
        if let Some(v) = update.push_notifications {
            self.push_notifications = v;
        }
        if let Some(v) = update.mobile_notifications {
            self.mobile_notifications = v;
        }
        if let Some(v) = update.two_factor_auth {
            self.two_factor_auth = v;
        }
        if let Some(v) = update.public_profile {
            self.public_profile = v;
        }
        if let Some(theme) = update.theme {
            self.theme = theme;
        }
        self
    }
}

/// Public user response (safe to return via API)
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_absent_fields() {
        let update = UpdateSettings {
            theme: Some(Theme::Dark),
            push_notifications: Some(false),
            ..Default::default()
        };

        let merged = UserSettings::default().merge(&update);
        assert_eq!(merged.theme, Theme::Dark);
        assert!(!merged.push_notifications);
        assert!(merged.email_notifications);
        assert!(merged.public_profile);
    }

    #[test]
    fn test_settings_deserialize_with_missing_fields() {
        let settings: UserSettings = serde_json::from_str(r#"{"theme":"light"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.email_notifications);
    }
}
