use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use barter_types::policy::Denied;

use crate::views;

pub const UNAVAILABLE_MESSAGE: &str = "Database connection unavailable. Please try again later.";
const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Failure of an HTML route. Rendered as the error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { title: String, message: String },

    #[error("{message}")]
    Unauthorized { title: String, message: String },

    #[error("{message}")]
    Forbidden { title: String, message: String },

    #[error("{message}")]
    NotFound { title: String, message: String },

    #[error("{message}")]
    Conflict { title: String, message: String },

    /// The store could not be reached. Carries the underlying detail.
    #[error("Database connection unavailable. Please try again later.")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(title: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::BadRequest { title: title.into(), message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized { title: "Unauthorized".into(), message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden { title: "Unauthorized".into(), message: message.into() }
    }

    pub fn not_found(title: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::NotFound { title: title.into(), message: message.into() }
    }

    pub fn conflict(title: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict { title: title.into(), message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AppError::BadRequest { title, .. }
            | AppError::Unauthorized { title, .. }
            | AppError::Forbidden { title, .. }
            | AppError::NotFound { title, .. }
            | AppError::Conflict { title, .. } => title,
            AppError::Unavailable(_) => "Service Unavailable",
            AppError::Internal(_) => "Server Error",
        }
    }

    /// User-facing message. Internal failures never leak their cause here.
    pub fn message(&self) -> String {
        match self {
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::Unavailable(detail) => Some(detail.clone()),
            AppError::Internal(e) => Some(format!("{:#}", e)),
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            AppError::Unavailable(detail) => error!("Store unavailable: {}", detail),
            AppError::Internal(e) => error!("Internal error: {:#}", e),
            _ => {}
        }
    }
}

impl From<barter_db::Error> for AppError {
    fn from(err: barter_db::Error) -> Self {
        match err {
            barter_db::Error::Duplicate { field } => AppError::conflict(
                "Duplicate Entry",
                format!("A record with this {} already exists.", field),
            ),
            barter_db::Error::Unavailable(detail) => AppError::Unavailable(detail),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<Denied> for AppError {
    fn from(denied: Denied) -> Self {
        AppError::forbidden(denied.message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let page = views::error_page(self.title(), &self.message(), None);
        let mut resp = (self.status(), Html(page)).into_response();
        if let Some(detail) = self.detail() {
            resp.extensions_mut().insert(ErrorDetail {
                title: self.title().to_string(),
                message: self.message(),
                detail,
                json: false,
            });
        }
        resp
    }
}

/// Cause of a failed response, attached as a response extension. Bodies are
/// rendered without it; [`crate::middleware::expose_error_detail`] re-renders
/// them with the detail in development.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub title: String,
    pub message: String,
    pub detail: String,
    pub json: bool,
}

impl ErrorDetail {
    pub fn render(self, status: StatusCode) -> Response {
        if self.json {
            let body = json!({
                "success": false,
                "message": self.message,
                "error": self.detail,
            });
            (status, Json(body)).into_response()
        } else {
            let page = views::error_page(&self.title, &self.message, Some(&self.detail));
            (status, Html(page)).into_response()
        }
    }
}

/// Failure of a JSON route: `{ "success": false, "message": ... }`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(AppError::bad_request("Bad Request", message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError(AppError::unauthorized(message))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError(AppError::forbidden(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError(AppError::not_found("Not Found", message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError(AppError::conflict("Conflict", message))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<barter_db::Error> for ApiError {
    fn from(err: barter_db::Error) -> Self {
        ApiError(err.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(err.into())
    }
}

impl From<Denied> for ApiError {
    fn from(denied: Denied) -> Self {
        ApiError(denied.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();

        let body = json!({
            "success": false,
            "message": err.message(),
        });
        let mut resp = (err.status(), Json(body)).into_response();
        if let Some(detail) = err.detail() {
            resp.extensions_mut().insert(ErrorDetail {
                title: err.title().to_string(),
                message: err.message(),
                detail,
                json: true,
            });
        }
        resp
    }
}

/// Response for a handler that panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    let page = views::error_page("Server Error", INTERNAL_MESSAGE, None);
    let mut resp = (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response();
    resp.extensions_mut().insert(ErrorDetail {
        title: "Server Error".to_string(),
        message: INTERNAL_MESSAGE.to_string(),
        detail,
        json: false,
    });
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let dup: AppError = barter_db::Error::Duplicate { field: "email".into() }.into();
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert!(dup.message().contains("email"));

        let down: AppError = barter_db::Error::Unavailable("locked".into()).into();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(down.message(), UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = AppError::Internal(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("disk"));
    }

    #[test]
    fn detail_travels_beside_the_body() {
        let resp = AppError::Unavailable("DB lock poisoned".into()).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let detail = resp.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.detail, "DB lock poisoned");
        assert_eq!(detail.message, UNAVAILABLE_MESSAGE);
        assert!(!detail.json);

        let resp = ApiError::not_found("Message not found").into_response();
        assert!(resp.extensions().get::<ErrorDetail>().is_none());
    }
}
