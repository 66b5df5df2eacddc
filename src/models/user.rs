use super::catalog::CatalogAnime;
use crate::entities::{favorites, users, watchlist};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<Vec<WatchlistEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorites: Option<Vec<FavoriteEntry>>,
}

impl From<users::Model> for UserProfile {
    fn from(m: users::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            username: m.username,
            avatar: m.avatar,
            created_at: m.created_at,
            updated_at: m.updated_at,
            watchlist: None,
            favorites: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email required".to_string());
        }
        if !email.contains('@') {
            return Err(format!("Invalid email: {email}"));
        }
        if self.username.trim().is_empty() {
            return Err("Username required".to_string());
        }
        Ok(())
    }
}

/// Where an anime sits in a user's watchlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Watching,
    Completed,
    #[default]
    Planned,
    Dropped,
}

impl WatchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::Planned => "planned",
            Self::Dropped => "dropped",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "watching" => Ok(Self::Watching),
            "completed" => Ok(Self::Completed),
            "planned" => Ok(Self::Planned),
            "dropped" => Ok(Self::Dropped),
            other => Err(format!("Invalid watchlist status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub user_id: String,
    pub anime_id: String,
    pub status: WatchStatus,
    pub progress: i32,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anime: Option<CatalogAnime>,
}

impl WatchlistEntry {
    /// Rows written by older builds may carry an unknown status; they read
    /// back as `planned`.
    pub fn from_model(m: watchlist::Model, anime: Option<CatalogAnime>) -> Self {
        Self {
            status: m.status.parse().unwrap_or_default(),
            id: m.id,
            user_id: m.user_id,
            anime_id: m.anime_id,
            progress: m.progress,
            created_at: m.created_at,
            updated_at: m.updated_at,
            anime,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistEntry {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub anime_id: String,
    #[serde(default)]
    pub status: WatchStatus,
    #[serde(default)]
    pub progress: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchlistUpdate {
    pub status: Option<WatchStatus>,
    pub progress: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: String,
    pub user_id: String,
    pub anime_id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anime: Option<CatalogAnime>,
}

impl FavoriteEntry {
    pub fn from_model(m: favorites::Model, anime: Option<CatalogAnime>) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            anime_id: m.anime_id,
            created_at: m.created_at,
            anime,
        }
    }
}

/// Body of favorite creation, and query of watchlist/favorite removal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnimePair {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub anime_id: String,
}

impl UserAnimePair {
    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("User ID required".to_string());
        }
        if self.anime_id.trim().is_empty() {
            return Err("Anime ID required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_parsing() {
        assert_eq!("Watching".parse::<WatchStatus>(), Ok(WatchStatus::Watching));
        assert_eq!(" dropped ".parse::<WatchStatus>(), Ok(WatchStatus::Dropped));
        assert!("paused".parse::<WatchStatus>().is_err());
        assert_eq!(WatchStatus::default(), WatchStatus::Planned);
    }

    #[test]
    fn test_watch_status_serializes_lowercase() {
        let value = serde_json::to_value(WatchStatus::Completed).unwrap();
        assert_eq!(value, serde_json::json!("completed"));
    }

    #[test]
    fn test_new_user_validation() {
        let mut user = NewUser {
            email: "eren@example.com".into(),
            username: "eren".into(),
            avatar: None,
        };
        assert!(user.validate().is_ok());

        user.email = "not-an-email".into();
        assert!(user.validate().is_err());

        user.email = "eren@example.com".into();
        user.username = "  ".into();
        assert_eq!(user.validate().unwrap_err(), "Username required");
    }

    #[test]
    fn test_unknown_stored_status_reads_as_planned() {
        let entry = WatchlistEntry::from_model(
            watchlist::Model {
                id: "w1".into(),
                user_id: "u1".into(),
                anime_id: "a1".into(),
                status: "on-hold".into(),
                progress: 3,
                created_at: String::new(),
                updated_at: String::new(),
            },
            None,
        );
        assert_eq!(entry.status, WatchStatus::Planned);
        assert_eq!(entry.progress, 3);
    }

    #[test]
    fn test_pair_validation_names_missing_field() {
        let pair = UserAnimePair {
            user_id: "u1".into(),
            anime_id: String::new(),
        };
        assert_eq!(pair.validate().unwrap_err(), "Anime ID required");
    }
}
