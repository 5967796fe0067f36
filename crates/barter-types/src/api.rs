use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{SessionUser, User};

/// Envelope for every JSON response: `{ success, message, data? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

// -- Auth --

/// Fields are optional so missing values get a field-level message instead
/// of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub userrole: String,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            userrole: user.role.clone(),
        }
    }
}

impl From<&SessionUser> for UserData {
    fn from(user: &SessionUser) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            userrole: user.role.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserData>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Left loose so a non-string value gets the same "required" message as a
    /// missing one.
    pub receiver_id: Option<Value>,
    pub text: Option<Value>,
}

impl SendMessageRequest {
    pub fn receiver_id(&self) -> Option<&str> {
        self.receiver_id
            .as_ref()
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
    }

    /// Trimmed text, empty when missing or not a string.
    pub fn text(&self) -> &str {
        self.text.as_ref().and_then(Value::as_str).unwrap_or("").trim()
    }
}

#[derive(Debug, Serialize)]
pub struct MessagingEndpoints {
    pub send: &'static str,
    pub conversation: &'static str,
    pub delete: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessagingStatus {
    pub success: bool,
    pub message: &'static str,
    pub endpoints: MessagingEndpoints,
}
