use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Fresh document id for any collection.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} status `{value}`")]
pub struct StatusParseError {
    pub kind: &'static str,
    pub value: String,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public user info, never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

// -- Items --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Swapped,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Swapped => "swapped",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "swapped" => Ok(ItemStatus::Swapped),
            other => Err(StatusParseError {
                kind: "item",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemImage {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// An item listing. The image bytes live in a separate lookup so listings
/// stay light; `has_image` says whether one is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub category: Option<String>,
    pub wanted_categories: Vec<String>,
    pub image_url: Option<String>,
    pub has_image: bool,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn is_swapped(&self) -> bool {
        self.status == ItemStatus::Swapped
    }

    /// Image link to show for this item, if any.
    pub fn display_image_url(&self) -> Option<String> {
        match &self.image_url {
            Some(url) if !url.is_empty() => Some(url.clone()),
            _ if self.has_image => Some(image_path(&self.item_id)),
            _ => None,
        }
    }
}

pub fn image_path(item_id: &str) -> String {
    format!("/items/{}/image", item_id)
}

// -- Swap requests --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl SwapStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SwapStatus::Pending),
            "accepted" => Ok(SwapStatus::Accepted),
            "rejected" => Ok(SwapStatus::Rejected),
            "cancelled" => Ok(SwapStatus::Cancelled),
            other => Err(StatusParseError {
                kind: "swap request",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub swap_request_id: String,
    /// The item being asked for.
    pub item_id: String,
    pub offered_item_id: String,
    pub requester_id: String,
    /// Owner of `item_id` when the request was made.
    pub receiver_id: String,
    pub message: String,
    pub image_url: Option<String>,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

// -- Messages --

pub const DELETED_MESSAGE_TEXT: &str = "[deleted]";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Audit log --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub log_id: String,
    pub action: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// -- Sessions --

/// Identity payload carried by an authenticated browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    /// One-shot notice shown on the next rendered page.
    pub flash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_strings() {
        for status in [
            SwapStatus::Pending,
            SwapStatus::Accepted,
            SwapStatus::Rejected,
            SwapStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<SwapStatus>(), Ok(status));
        }
        assert_eq!("swapped".parse::<ItemStatus>(), Ok(ItemStatus::Swapped));
        assert!("archived".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn display_image_url_prefers_stored_url() {
        let now = Utc::now();
        let mut item = Item {
            item_id: "abc".into(),
            title: "Lamp".into(),
            description: "Brass".into(),
            owner_id: "u1".into(),
            category: None,
            wanted_categories: vec![],
            image_url: None,
            has_image: false,
            status: ItemStatus::Available,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(item.display_image_url(), None);

        item.has_image = true;
        assert_eq!(item.display_image_url().as_deref(), Some("/items/abc/image"));

        item.image_url = Some("/items/abc/image?v=42".into());
        assert_eq!(item.display_image_url().as_deref(), Some("/items/abc/image?v=42"));
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let now = Utc::now();
        let user = User {
            user_id: "u1".into(),
            username: "Rana".into(),
            email: "rana@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: DEFAULT_ROLE.into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"userId\":\"u1\""));
    }
}
